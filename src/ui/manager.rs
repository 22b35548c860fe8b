//! ImGui overlay
//!
//! Owns the ImGui context, its winit platform glue and its wgpu renderer.
//! A frame is built with [`UiManager::update_logic`] before the scene is
//! updated, then drawn with [`UiManager::render_overlay`] on top of the
//! composited image.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

pub const DEFAULT_FONT_SIZE: f32 = 18.0;

/// Which ImGui capture flag decides whether an event stays with the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Pointer,
    Keyboard,
    /// Forwarded to ImGui but never captured
    Passive,
}

fn input_kind(event: &WindowEvent) -> Option<InputKind> {
    match event {
        WindowEvent::CursorMoved { .. }
        | WindowEvent::MouseInput { .. }
        | WindowEvent::MouseWheel { .. } => Some(InputKind::Pointer),
        WindowEvent::KeyboardInput { .. } => Some(InputKind::Keyboard),
        WindowEvent::ModifiersChanged(_)
        | WindowEvent::Focused(_)
        | WindowEvent::CursorLeft { .. } => Some(InputKind::Passive),
        _ => None,
    }
}

pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
    /// Set once a frame has been built and not yet drawn
    frame_pending: bool,
}

impl UiManager {
    /// Display size follows the surface in physical pixels, so the DPI factor
    /// is locked to 1.
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
        font_size: f32,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                size_pixels: font_size,
                oversample_h: 1,
                pixel_snap_h: true,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_color_format,
                ..Default::default()
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
            frame_pending: false,
        }
    }

    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Forwards an input event to ImGui. Returns true when the UI keeps it:
    /// pointer events while the cursor is over a window, key events while a
    /// widget has keyboard focus.
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        let Some(kind) = input_kind(event) else {
            return false;
        };

        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &wrapped);

        let io = self.context.io();
        match kind {
            InputKind::Pointer => io.want_capture_mouse,
            InputKind::Keyboard => io.want_capture_keyboard,
            InputKind::Passive => false,
        }
    }

    /// Whether the pointer is over the UI
    pub fn wants_pointer(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Builds this frame's UI. Returns whether the pointer is over the UI.
    pub fn update_logic<F>(&mut self, window: &Window, build: F) -> bool
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("skipping UI frame: {}", e);
            self.frame_pending = false;
            return false;
        }

        let ui = self.context.frame();
        build(ui);

        let cursor = ui.mouse_cursor();
        if self.last_cursor != cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
        self.frame_pending = true;

        self.wants_pointer()
    }

    /// Draws the pending frame over `target` without clearing it
    pub fn render_overlay(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
    ) {
        if !std::mem::take(&mut self.frame_pending) {
            return;
        }

        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ui_overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self.renderer.render(draw_data, queue, device, &mut pass) {
            log::error!("failed to draw UI overlay: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn focus_is_forwarded_but_never_captured() {
        assert_eq!(input_kind(&WindowEvent::Focused(true)), Some(InputKind::Passive));
    }

    #[test]
    fn window_events_are_not_ui_input() {
        assert_eq!(input_kind(&WindowEvent::Resized(PhysicalSize::new(10, 10))), None);
        assert_eq!(input_kind(&WindowEvent::CloseRequested), None);
        assert_eq!(input_kind(&WindowEvent::RedrawRequested), None);
    }
}
