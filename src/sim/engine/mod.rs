pub mod config;
pub mod images;
pub mod result;

use std::collections::VecDeque;

use anyhow::Result;

use crate::geom::point::Point;
use crate::sim::element::{Category, Intersection, OpticalElement};
use crate::sim::ray::SimulationRay;

use self::config::{EngineConfig, Observer, ViewMode};
use self::result::{TraceResult, TracedSegment};

/// Length of segments drawn for rays that leave the scene, and of backward extensions.
pub const ESCAPE_LENGTH: f64 = 10000.0;

/// Brightness factor of the backward extension drawn for an observed ray.
pub const OBSERVED_EXTENSION_FACTOR: f64 = 0.5;

/// Breadth-first ray propagation through a borrowed set of elements.
pub struct RaySimulation<'a> {
    config: EngineConfig,
    elements: Vec<&'a dyn OpticalElement>,
}

/// A queued ray together with its depth in the chain.
struct QueuedRay {
    ray: SimulationRay,
    depth: usize,
}

/// Per-trace statistics for logging.
#[derive(Debug, Default)]
struct TraceStats {
    processed: usize,
    escaped: usize,
    depth_capped: usize,
    dimmed: usize,
}

impl<'a> RaySimulation<'a> {
    pub fn new<I>(elements: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a dyn OpticalElement>,
    {
        config.validate()?;
        Ok(Self {
            config,
            elements: elements.into_iter().collect(),
        })
    }

    /// Runs the trace to completion.
    ///
    /// Rays are processed in FIFO order, so the segment order is reproducible.
    pub fn run(&self) -> TraceResult {
        let mut result = TraceResult::new();
        let mut stats = TraceStats::default();
        let mut queue: VecDeque<QueuedRay> = VecDeque::new();

        let observer = self.observer();

        for element in &self.elements {
            for ray in element.emit_rays(self.config.ray_density, self.config.mode) {
                result.rays.push(ray);
                self.enqueue(&mut queue, ray, 0, &mut result, &mut stats);
            }
        }

        while let Some(QueuedRay { ray, depth }) = queue.pop_front() {
            if depth >= self.config.max_ray_depth {
                result.truncation_error += ray.brightness();
                stats.depth_capped += 1;
                continue;
            }
            stats.processed += 1;

            let Some((idx, hit)) = self.nearest_intersection(&ray) else {
                stats.escaped += 1;
                self.record_escaped(&ray, observer, &mut result);
                continue;
            };

            self.record_hit(&ray, &hit, observer, &mut result);

            let interaction = self.elements[idx].on_ray_incident(&ray, &hit);
            result.truncation_error += interaction.truncation.max(0.0);
            if !interaction.is_absorbed
                && let Some(outgoing) = interaction.outgoing_ray
            {
                self.enqueue(&mut queue, outgoing, depth + 1, &mut result, &mut stats);
            }
            for new_ray in interaction.new_rays {
                self.enqueue(&mut queue, new_ray, depth + 1, &mut result, &mut stats);
            }
        }

        if self.config.mode == ViewMode::Images {
            result.images = images::detect_images(&result.segments);
        }

        log::debug!(
            "Trace finished: {} emitted, {} processed, {} escaped, {} depth-capped, {} dimmed, \
             {} segments, {} images, truncation {:.4}",
            result.rays.len(),
            stats.processed,
            stats.escaped,
            stats.depth_capped,
            stats.dimmed,
            result.segments.len(),
            result.images.len(),
            result.truncation_error
        );

        result
    }

    /// Observer used for visibility tagging, if the mode asks for one.
    fn observer(&self) -> Option<Observer> {
        if self.config.mode != ViewMode::Observer {
            return None;
        }
        if self.config.observer.is_none() {
            log::warn!("Observer mode without an observer; visibility tagging is disabled");
        }
        self.config.observer
    }

    /// Queues a ray unless it is below the brightness floor.
    fn enqueue(
        &self,
        queue: &mut VecDeque<QueuedRay>,
        ray: SimulationRay,
        depth: usize,
        result: &mut TraceResult,
        stats: &mut TraceStats,
    ) {
        let brightness = ray.brightness();
        if brightness < self.config.min_brightness {
            result.truncation_error += brightness;
            stats.dimmed += 1;
            return;
        }
        queue.push_back(QueuedRay { ray, depth });
    }

    /// Closest hit among all non-source elements.
    ///
    /// Ties keep the element that comes first in scene order.
    fn nearest_intersection(&self, ray: &SimulationRay) -> Option<(usize, Intersection)> {
        let mut closest: Option<(usize, Intersection)> = None;

        for (idx, element) in self.elements.iter().enumerate() {
            if element.category() == Category::LightSource {
                continue;
            }
            if let Some(hit) = element.check_ray_intersection(ray) {
                match &closest {
                    None => closest = Some((idx, hit)),
                    Some((_, best)) if hit.t < best.t => closest = Some((idx, hit)),
                    _ => {}
                }
            }
        }

        closest
    }

    fn record_escaped(
        &self,
        ray: &SimulationRay,
        observer: Option<Observer>,
        result: &mut TraceResult,
    ) {
        let end = ray.point_at(ESCAPE_LENGTH);
        self.record_forward(ray, end, ESCAPE_LENGTH, observer, result);
    }

    fn record_hit(
        &self,
        ray: &SimulationRay,
        hit: &Intersection,
        observer: Option<Observer>,
        result: &mut TraceResult,
    ) {
        self.record_forward(ray, hit.point, hit.t, observer, result);
    }

    /// Records the forward segment plus whatever the view mode adds to it.
    fn record_forward(
        &self,
        ray: &SimulationRay,
        end: Point,
        length: f64,
        observer: Option<Observer>,
        result: &mut TraceResult,
    ) {
        let mut forward = TracedSegment::forward(ray, end);

        if self.config.mode.draws_extensions() && !ray.gap {
            result.segments.push(forward);
            result.segments.push(TracedSegment::extension(ray, ESCAPE_LENGTH));
            return;
        }

        if let Some(observer) = observer
            && observes(&observer, ray, length)
        {
            forward.is_observed = true;
            result.segments.push(forward);
            let mut extension = TracedSegment::extension(ray, ESCAPE_LENGTH);
            extension.brightness *= OBSERVED_EXTENSION_FACTOR;
            extension.is_observed = true;
            result.segments.push(extension);
            return;
        }

        result.segments.push(forward);
    }
}

/// True if the observer lies within its radius of the ray line, between the
/// ray origin and `length` along it.
fn observes(observer: &Observer, ray: &SimulationRay, length: f64) -> bool {
    let to_observer = observer.position - ray.origin;
    let projection = to_observer.dot(&ray.direction);
    if projection < 0.0 || projection > length {
        return false;
    }
    ray.direction.cross(&to_observer).abs() <= observer.radius
}
