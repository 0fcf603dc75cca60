use std::{collections::BTreeMap, time::Duration};

use bevy::{
    app::{App, Plugin, PostUpdate},
    prelude::{ResMut, Resource},
    utils::Instant,
};

#[derive(Debug, Clone)]
pub struct ProfilerPoint {
    /// Ticks since the point was recorded.
    pub age: u32,
    /// Monitor average at the time the point was stored.
    pub average: f32,
    pub begin: Instant,
    pub end: Instant,
}

pub struct ProfilerPointRecordGuard<'a> {
    point: &'a mut ProfilerPoint,
}

impl Drop for ProfilerPointRecordGuard<'_> {
    fn drop(&mut self) {
        self.point.end = Instant::now();
    }
}

impl ProfilerPoint {
    pub fn new() -> ProfilerPoint {
        let now = Instant::now();
        ProfilerPoint {
            age: 0,
            average: 0.0,
            begin: now,
            end: now,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.begin)
    }

    /// Starts timing; the point's end is stamped when the guard drops.
    pub fn record(&mut self) -> ProfilerPointRecordGuard {
        self.begin = Instant::now();
        ProfilerPointRecordGuard { point: self }
    }
}

impl Default for ProfilerPoint {
    fn default() -> Self {
        ProfilerPoint::new()
    }
}

/// A monitor for a specific task.
///
/// This monitor keeps track of the average duration of a task and its history.
#[derive(Debug)]
pub struct ProfilerMonitor {
    pub name: String,
    pub points: Vec<ProfilerPoint>,
}

impl ProfilerMonitor {
    /// Returns the average duration of the task in seconds, based on the history of durations.
    pub fn average(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        let sum: f32 = self
            .points
            .iter()
            .map(|point| point.duration().as_secs_f32())
            .sum();
        sum / self.points.len() as f32
    }

    /// Returns the history of the task.
    ///
    /// This will not include the latest point
    pub fn history(&self) -> impl Iterator<Item = &ProfilerPoint> {
        self.points.iter().rev().skip(1)
    }
}

#[derive(Debug, Resource)]
pub struct Profiler {
    monitors: BTreeMap<String, ProfilerMonitor>,
    pub max_ticks: u32,
}

impl Default for Profiler {
    fn default() -> Self {
        Profiler::new(300)
    }
}

pub struct ProfilerRecordGuard<'a> {
    monitor: String,
    profiler: &'a mut Profiler,
    point: ProfilerPoint,
}

impl Drop for ProfilerRecordGuard<'_> {
    fn drop(&mut self) {
        self.point.end = Instant::now();
        if let Some(monitor) = self.profiler.monitors.get_mut(&self.monitor) {
            self.point.average = monitor.average();
            monitor.points.push(self.point.clone());
        }
    }
}

impl Profiler {
    pub fn new(max_ticks: u32) -> Profiler {
        Profiler {
            monitors: BTreeMap::new(),
            max_ticks,
        }
    }

    fn ensure_monitor(&mut self, name: &str) -> &mut ProfilerMonitor {
        self.monitors
            .entry(name.to_string())
            .or_insert_with(|| ProfilerMonitor {
                name: name.to_string(),
                points: Vec::new(),
            })
    }

    /// Times the rest of the caller's scope under `name`.
    pub fn record(&mut self, name: &str) -> ProfilerRecordGuard {
        self.ensure_monitor(name);

        ProfilerRecordGuard {
            monitor: name.to_string(),
            profiler: self,
            point: ProfilerPoint::new(),
        }
    }

    pub fn record_manual(&mut self, name: &str, point: ProfilerPoint) {
        let monitor = self.ensure_monitor(name);
        let mut point = point;
        point.average = monitor.average();

        monitor.points.push(point);
    }

    pub fn monitor(&self, name: &str) -> Option<&ProfilerMonitor> {
        self.monitors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfilerMonitor> {
        self.monitors.values()
    }

    /// Drops points that reached `max_ticks` and ages the rest by one tick.
    pub fn tick(&mut self) {
        let max_ticks = self.max_ticks;
        for monitor in self.monitors.values_mut() {
            monitor.points.retain(|point| point.age < max_ticks);
            for point in monitor.points.iter_mut() {
                point.age += 1;
            }
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Plugin                                   */
/* -------------------------------------------------------------------------- */

pub struct ProfilerPlugin {
    pub max_ticks: u32,
}

impl Plugin for ProfilerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Profiler::new(self.max_ticks));
        app.add_systems(PostUpdate, sys_update);
    }
}

impl Default for ProfilerPlugin {
    fn default() -> Self {
        ProfilerPlugin { max_ticks: 300 }
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Systems                                  */
/* -------------------------------------------------------------------------- */

fn sys_update(mut profiler: ResMut<Profiler>) {
    let mut record = ProfilerPoint::new();
    {
        let _recorder = record.record();
        profiler.tick();
    }
    profiler.record_manual("Profiler::sys_update", record);
}
