//! Ordered description of the passes making up one frame.
//!
//! `Renderer::render_frame` walks [`pass_plan`] in order, so the ordering rules
//! can be checked without a GPU.

/// Gaussian blur iterations per frame.
pub const BLUR_ITERATIONS: usize = 10;

/// Index of the ping-pong buffer that receives the composite and the crosshair.
pub const COMPOSITE_BUFFER: usize = 2;

/// Render target of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTarget {
    /// HDR framebuffer: scene colour + bloom-threshold colour + depth.
    Hdr,
    /// One of the three ping-pong colour buffers.
    PingPong(usize),
    /// The swapchain image.
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// `src * src_alpha + dst * (1 - src_alpha)`
    Alpha,
}

/// Texture a blur iteration reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    /// Second colour attachment of the HDR framebuffer.
    BloomThreshold,
    PingPong(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurStep {
    pub source: BlurSource,
    /// Ping-pong buffer written by this iteration (0 or 1).
    pub target: usize,
    pub horizontal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Scene,
    Blur(BlurStep),
    Composite,
    Overlay,
    Crt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassDesc {
    pub kind: PassKind,
    pub target: PassTarget,
    pub blend: BlendMode,
    /// Clear the target before drawing (otherwise load existing contents).
    pub clear: bool,
}

/// Ping-pong blur schedule. The first iteration is horizontal, reads the
/// bloom-threshold attachment and writes buffer 1; every later iteration reads
/// what the previous one wrote and flips direction and target.
pub fn blur_schedule(iterations: usize) -> Vec<BlurStep> {
    (0..iterations)
        .map(|i| {
            let horizontal = i % 2 == 0;
            let target = usize::from(horizontal);
            let source = if i == 0 {
                BlurSource::BloomThreshold
            } else {
                BlurSource::PingPong(1 - target)
            };
            BlurStep {
                source,
                target,
                horizontal,
            }
        })
        .collect()
}

/// Texture holding the finished blur after `iterations` passes.
pub fn blurred_output(iterations: usize) -> BlurSource {
    blur_schedule(iterations)
        .last()
        .map_or(BlurSource::BloomThreshold, |step| BlurSource::PingPong(step.target))
}

/// All passes of one frame in submission order.
pub fn pass_plan(blur_iterations: usize) -> Vec<PassDesc> {
    let mut plan = Vec::with_capacity(blur_iterations + 4);
    plan.push(PassDesc {
        kind: PassKind::Scene,
        target: PassTarget::Hdr,
        blend: BlendMode::Opaque,
        clear: true,
    });
    plan.extend(blur_schedule(blur_iterations).into_iter().map(|step| PassDesc {
        kind: PassKind::Blur(step),
        target: PassTarget::PingPong(step.target),
        blend: BlendMode::Opaque,
        clear: true,
    }));
    plan.push(PassDesc {
        kind: PassKind::Composite,
        target: PassTarget::PingPong(COMPOSITE_BUFFER),
        blend: BlendMode::Opaque,
        clear: true,
    });
    plan.push(PassDesc {
        kind: PassKind::Overlay,
        target: PassTarget::PingPong(COMPOSITE_BUFFER),
        blend: BlendMode::Alpha,
        clear: false,
    });
    plan.push(PassDesc {
        kind: PassKind::Crt,
        target: PassTarget::Surface,
        blend: BlendMode::Opaque,
        clear: true,
    });
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_runs_fixed_iterations_from_bloom_threshold() {
        let schedule = blur_schedule(BLUR_ITERATIONS);
        assert_eq!(schedule.len(), 10);
        assert_eq!(schedule[0].source, BlurSource::BloomThreshold);
        assert!(schedule[0].horizontal);
        assert_eq!(schedule[0].target, 1);
        assert!(schedule[1..]
            .iter()
            .all(|s| matches!(s.source, BlurSource::PingPong(_))));
    }

    #[test]
    fn blur_alternates_direction_and_reads_previous_target() {
        let schedule = blur_schedule(BLUR_ITERATIONS);
        for pair in schedule.windows(2) {
            assert_ne!(pair[0].horizontal, pair[1].horizontal);
            assert_ne!(pair[0].target, pair[1].target);
            assert_eq!(pair[1].source, BlurSource::PingPong(pair[0].target));
        }
        assert!(schedule.iter().all(|s| s.target < COMPOSITE_BUFFER));
    }

    #[test]
    fn blurred_output_is_buffer_zero_after_even_iterations() {
        assert_eq!(blurred_output(10), BlurSource::PingPong(0));
        assert_eq!(blurred_output(3), BlurSource::PingPong(1));
        assert_eq!(blurred_output(0), BlurSource::BloomThreshold);
    }

    #[test]
    fn plan_order_is_fixed() {
        let plan = pass_plan(BLUR_ITERATIONS);
        assert_eq!(plan.len(), BLUR_ITERATIONS + 4);
        assert_eq!(plan[0].kind, PassKind::Scene);
        assert_eq!(plan[0].target, PassTarget::Hdr);
        let blur_count = plan
            .iter()
            .filter(|p| matches!(p.kind, PassKind::Blur(_)))
            .count();
        assert_eq!(blur_count, BLUR_ITERATIONS);
        let tail: Vec<PassKind> = plan[plan.len() - 3..].iter().map(|p| p.kind).collect();
        assert_eq!(tail, vec![PassKind::Composite, PassKind::Overlay, PassKind::Crt]);
    }

    #[test]
    fn crosshair_lands_on_composite_target() {
        let plan = pass_plan(BLUR_ITERATIONS);
        let composite = plan.iter().find(|p| p.kind == PassKind::Composite).map(|p| p.target);
        let overlay = plan.iter().find(|p| p.kind == PassKind::Overlay).copied();
        let overlay = overlay.expect("overlay pass");
        assert_eq!(Some(overlay.target), composite);
        assert_eq!(overlay.blend, BlendMode::Alpha);
        assert!(!overlay.clear);
    }

    #[test]
    fn frame_ends_on_surface_with_blending_off() {
        let plan = pass_plan(BLUR_ITERATIONS);
        let last = plan.last().expect("non-empty plan");
        assert_eq!(last.target, PassTarget::Surface);
        assert_eq!(last.blend, BlendMode::Opaque);
        // Only the overlay blends.
        assert_eq!(plan.iter().filter(|p| p.blend == BlendMode::Alpha).count(), 1);
    }
}
