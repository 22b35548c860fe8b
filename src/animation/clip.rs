//! Animation clips and keyframe sampling
//!
//! Clips animate node translation, rotation and scale. Sampling clamps to the
//! first/last key outside the keyed range.

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};

use crate::assets::NodeTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

#[derive(Debug, Clone)]
pub enum ChannelOutput {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
}

impl ChannelOutput {
    fn len(&self) -> usize {
        match self {
            ChannelOutput::Translation(v) | ChannelOutput::Scale(v) => v.len(),
            ChannelOutput::Rotation(v) => v.len(),
        }
    }
}

/// One animated property of one node
#[derive(Debug, Clone)]
pub struct Channel {
    pub node: usize,
    pub times: Vec<f32>,
    pub output: ChannelOutput,
    pub interpolation: Interpolation,
}

impl Channel {
    /// Writes the sampled value at time `t` into `local`
    pub fn apply(&self, t: f32, local: &mut NodeTransform) {
        let count = self.times.len().min(self.output.len());
        if count == 0 {
            return;
        }
        let (i, j, f) = key_span(&self.times[..count], t);
        let f = match self.interpolation {
            Interpolation::Step => 0.0,
            Interpolation::Linear => f,
        };

        match &self.output {
            ChannelOutput::Translation(values) => {
                local.translation = values[i].lerp(values[j], f);
            }
            ChannelOutput::Scale(values) => {
                local.scale = values[i].lerp(values[j], f);
            }
            ChannelOutput::Rotation(values) => {
                local.rotation = if i == j || f == 0.0 {
                    values[i]
                } else {
                    values[i].slerp(values[j], f).normalize()
                };
            }
        }
    }
}

/// Indices of the keys surrounding `t` and the blend factor between them
fn key_span(times: &[f32], t: f32) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if t <= times[0] {
        return (0, 0, 0.0);
    }
    if t >= times[last] {
        return (last, last, 0.0);
    }

    let j = times.partition_point(|&k| k <= t).min(last);
    let i = j - 1;
    let span = times[j] - times[i];
    let f = if span > 0.0 { (t - times[i]) / span } else { 0.0 };
    (i, j, f)
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds; the time of the last key across all channels
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0f32, f32::max);

        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Samples every channel at `t` into the node-indexed `pose`.
    /// Channels targeting nodes outside the pose are skipped.
    pub fn apply(&self, t: f32, pose: &mut [NodeTransform]) {
        for channel in &self.channels {
            if let Some(local) = pose.get_mut(channel.node) {
                channel.apply(t, local);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    fn translation_channel(interpolation: Interpolation) -> Channel {
        Channel {
            node: 0,
            times: vec![0.0, 1.0, 2.0],
            output: ChannelOutput::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(2.0, 4.0, 0.0),
            ]),
            interpolation,
        }
    }

    #[test]
    fn duration_is_last_key_time() {
        let clip = AnimationClip::new("walk", vec![translation_channel(Interpolation::Linear)]);
        assert_eq!(clip.duration, 2.0);
        assert_eq!(AnimationClip::new("empty", Vec::new()).duration, 0.0);
    }

    #[test]
    fn linear_sampling_interpolates_between_keys() {
        let channel = translation_channel(Interpolation::Linear);
        let mut local = NodeTransform::default();

        channel.apply(0.5, &mut local);
        assert_eq!(local.translation, Vector3::new(1.0, 0.0, 0.0));

        channel.apply(1.5, &mut local);
        assert_eq!(local.translation, Vector3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn step_sampling_holds_previous_key() {
        let channel = translation_channel(Interpolation::Step);
        let mut local = NodeTransform::default();

        channel.apply(0.99, &mut local);
        assert_eq!(local.translation, Vector3::new(0.0, 0.0, 0.0));

        channel.apply(1.0, &mut local);
        assert_eq!(local.translation, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn sampling_clamps_outside_keyed_range() {
        let channel = translation_channel(Interpolation::Linear);
        let mut local = NodeTransform::default();

        channel.apply(-3.0, &mut local);
        assert_eq!(local.translation, Vector3::new(0.0, 0.0, 0.0));

        channel.apply(10.0, &mut local);
        assert_eq!(local.translation, Vector3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn rotation_channel_slerps() {
        let start = Quaternion::from_angle_y(Deg(0.0));
        let end = Quaternion::from_angle_y(Deg(90.0));
        let channel = Channel {
            node: 0,
            times: vec![0.0, 1.0],
            output: ChannelOutput::Rotation(vec![start, end]),
            interpolation: Interpolation::Linear,
        };
        let mut local = NodeTransform::default();
        channel.apply(0.5, &mut local);

        let expected = Quaternion::from_angle_y(Deg(45.0));
        assert!((local.rotation.dot(expected).abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn channels_for_missing_nodes_are_skipped() {
        let mut channel = translation_channel(Interpolation::Linear);
        channel.node = 7;
        let clip = AnimationClip::new("stray", vec![channel]);
        let mut pose = vec![NodeTransform::default(); 2];
        clip.apply(1.0, &mut pose);
        assert_eq!(pose[0], NodeTransform::default());
    }
}
