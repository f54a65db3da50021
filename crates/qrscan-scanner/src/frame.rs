use std::time::Duration;

use image::DynamicImage;
use tokio::time::{Interval, MissedTickBehavior};

/// One decoded video frame
#[derive(Debug)]
pub struct Frame {
    image: DynamicImage,
}

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Source of paint opportunities for the detection loop
pub trait FrameClock: Send + Sync {
    /// A fresh ticker for one session
    fn ticker(&self) -> Box<dyn FrameTicker>;
}

#[async_trait::async_trait]
pub trait FrameTicker: Send {
    /// Suspend until the next frame may be processed
    async fn tick(&mut self);
}

/// Fixed-rate clock standing in for the display refresh
pub struct IntervalClock {
    period: Duration,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl FrameClock for IntervalClock {
    fn ticker(&self) -> Box<dyn FrameTicker> {
        let mut interval = tokio::time::interval(self.period);
        // A slow decode must not cause a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Box::new(IntervalTicker { interval })
    }
}

struct IntervalTicker {
    interval: Interval,
}

#[async_trait::async_trait]
impl FrameTicker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
