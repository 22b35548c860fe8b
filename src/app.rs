use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::assets::{AssetCache, Dispatch, GltfLoader};
use crate::config::AppConfig;
use crate::gfx::{
    camera::{OrbitCamera, OrbitControls},
    picking::screen_to_ray,
    RenderEngine,
};
use crate::params::{CompiledDefaults, ParameterSet, ParameterSource};
use crate::scene::{CameraRig, SceneAssembly, Stage};
use crate::ui::{manager::DEFAULT_FONT_SIZE, ParameterPanel, UiManager};

/// Longest frame step fed to the animation, so a stall does not skip ahead
const MAX_FRAME_STEP: f32 = 0.1;

/// Cursor travel in pixels between press and release still counted as a click
const CLICK_SLOP: f64 = 4.0;

pub struct SanctumApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    panel: ParameterPanel,
    /// Live values edited by the panel; `None` runs on compiled defaults
    params: Option<ParameterSet>,
    controls: OrbitControls,
    stage: Stage,
    last_frame: Instant,
    cursor: PhysicalPosition<f64>,
    press_position: Option<PhysicalPosition<f64>>,
    startup_error: Option<anyhow::Error>,
}

impl SanctumApp {
    /// Builds the scene from `config` and checks its placement rules
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("creating event loop")?;

        let assembly = SceneAssembly::standard(&config.models_dir, config.start_mode);
        let report = assembly
            .validate()
            .context("validating placement rules")?;
        if !report.ambiguous.is_empty() {
            log::warn!("{} model paths match more than one placement rule", report.ambiguous.len());
        }
        log::info!(
            "models from {}, start mode {:?}, panel {}",
            config.models_dir,
            config.start_mode,
            if config.panel { "on" } else { "off" }
        );

        let cache = AssetCache::new(Arc::new(GltfLoader), Dispatch::Background);
        let stage = Stage::new(cache, assembly);

        let aspect = config.width as f32 / config.height.max(1) as f32;
        let camera = OrbitCamera::from_rig(&CameraRig::default(), aspect);

        let params = config.panel.then(ParameterSet::standard);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                panel: ParameterPanel::default(),
                params,
                controls: OrbitControls::new(camera),
                stage,
                last_frame: Instant::now(),
                cursor: PhysicalPosition::new(0.0, 0.0),
                press_position: None,
                startup_error: None,
            },
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("running event loop")?;

        match self.app_state.startup_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("sanctum")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.config.width,
                        self.config.height,
                    )),
            )
            .context("creating window")?;
        let window_handle = Arc::new(window);

        let (width, height) = window_handle.inner_size().into();
        let renderer = pollster::block_on(RenderEngine::new(
            window_handle.clone(),
            width,
            height,
            self.config.vsync,
        ))?;

        self.controls.camera.resize_projection(width, height);

        if self.config.panel {
            let mut ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
                DEFAULT_FONT_SIZE,
            );
            ui_manager.update_display_size(width, height);
            self.ui_manager = Some(ui_manager);
        }

        self.render_engine = Some(renderer);
        self.window = Some(window_handle);
        self.last_frame = Instant::now();
        Ok(())
    }

    /// A left click that barely moved picks against the animated model
    fn handle_click(&mut self) {
        let Some(render_engine) = self.render_engine.as_ref() else {
            return;
        };
        let (width, height) = render_engine.get_surface_size();
        let ray = screen_to_ray(
            (self.cursor.x as f32, self.cursor.y as f32),
            (width as f32, height as f32),
            &self.controls.camera,
        );
        if self.stage.click(&ray) {
            log::info!("animation triggered");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) =
            (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_STEP);
        self.last_frame = now;

        // Panel edits land before the scene reads this frame's parameters
        if let (Some(ui_manager), Some(params)) = (self.ui_manager.as_mut(), self.params.as_mut()) {
            let panel = &self.panel;
            let wants_input = ui_manager.update_logic(window, |ui| {
                if panel.draw(ui, params) {
                    log::debug!("parameters changed");
                }
            });
            self.controls.set_input_blocked(wants_input);
        }

        let source: &dyn ParameterSource = match &self.params {
            Some(params) => params,
            None => &CompiledDefaults,
        };
        let tree = self.stage.frame(dt, source);
        let camera = self.controls.camera;

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame(
                &tree,
                &camera,
                Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                    ui_manager.render_overlay(device, queue, encoder, view);
                }),
            ),
            None => render_engine.render_frame(
                &tree,
                &camera,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("dropped frame: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            log::error!("failed to start: {:#}", e);
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // UI gets input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                self.press_position = None;
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    state: ElementState::Pressed,
                    ..
                } = key_event
                {
                    event_loop.exit();
                    return;
                }
                self.controls.keyboard_event(&key_event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.press_position = Some(self.cursor),
                ElementState::Released => {
                    let clicked = self.press_position.take().is_some_and(|press| {
                        let (dx, dy) = (self.cursor.x - press.x, self.cursor.y - press.y);
                        dx * dx + dy * dy <= CLICK_SLOP * CLICK_SLOP
                    });
                    if clicked {
                        self.handle_click();
                    }
                }
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.controls.camera.resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        if self.window.is_none() {
            return;
        }
        // Drags and wheel input over the panel are filtered by the controls
        self.controls.device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
