//! 陀螺仪指标收集模块
//!
//! 记录驱动运行指标 (Prometheus)，并在内存中聚合样本统计。

use contracts::{Axis, CalibrationOffsets, GyroSample};
use metrics::{counter, gauge, histogram};

/// 记录一个输出样本
///
/// 每次 sync 边界产生样本时调用。
pub fn record_sample(sample: &GyroSample) {
    counter!("gyro_samples_emitted_total").increment(1);

    for (axis, value) in [
        ("x", sample.axes.x),
        ("y", sample.axes.y),
        ("z", sample.axes.z),
    ] {
        gauge!("gyro_axis_rad_per_sec", "axis" => axis).set(f64::from(value));
    }
    histogram!("gyro_rate_magnitude_rad_per_sec").record(f64::from(sample.axes.magnitude()));
}

/// 记录被忽略的未知事件
pub fn record_unknown_event(event_type: u16, code: u16) {
    counter!(
        "gyro_unknown_events_total",
        "event_type" => event_type.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

/// 记录设备控制失败 (open / ioctl)
pub fn record_device_error(operation: &'static str) {
    counter!("gyro_device_errors_total", "operation" => operation).increment(1);
}

/// 记录校准偏移
pub fn record_calibration(offsets: &CalibrationOffsets) {
    for axis in Axis::ALL {
        gauge!("gyro_calibration_offset", "axis" => axis_label(axis))
            .set(f64::from(offsets.get(axis)));
    }
}

/// 记录单次 read_events 返回的样本数
pub fn record_read_batch(count: usize) {
    histogram!("gyro_read_batch_size").record(count as f64);
}

fn axis_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

/// 样本统计聚合器
///
/// 在内存中聚合各轴角速度与采样间隔，用于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SampleStatsAggregator {
    /// 样本总数
    pub total_samples: u64,

    /// 各轴角速度统计 (rad/s)
    pub axis_stats: [RunningStats; 3],

    /// 角速度模长统计 (rad/s)
    pub magnitude_stats: RunningStats,

    /// 相邻样本时间间隔统计 (ms)
    pub interval_stats: RunningStats,

    /// 时间戳未递增的样本数
    pub non_monotonic: u64,

    last_timestamp_ns: Option<i64>,
}

impl SampleStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, sample: &GyroSample) {
        self.total_samples += 1;

        self.axis_stats[Axis::X.index()].push(f64::from(sample.axes.x));
        self.axis_stats[Axis::Y.index()].push(f64::from(sample.axes.y));
        self.axis_stats[Axis::Z.index()].push(f64::from(sample.axes.z));
        self.magnitude_stats.push(f64::from(sample.axes.magnitude()));

        if let Some(last) = self.last_timestamp_ns {
            let delta = sample.timestamp_ns - last;
            if delta > 0 {
                self.interval_stats.push(delta as f64 / 1_000_000.0);
            } else {
                self.non_monotonic += 1;
            }
        }
        self.last_timestamp_ns = Some(sample.timestamp_ns);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> SampleSummary {
        let interval = StatsSummary::from(&self.interval_stats);
        SampleSummary {
            total_samples: self.total_samples,
            rate_hz: if interval.mean > 0.0 {
                1000.0 / interval.mean
            } else {
                0.0
            },
            x: StatsSummary::from(&self.axis_stats[Axis::X.index()]),
            y: StatsSummary::from(&self.axis_stats[Axis::Y.index()]),
            z: StatsSummary::from(&self.axis_stats[Axis::Z.index()]),
            magnitude: StatsSummary::from(&self.magnitude_stats),
            interval_ms: interval,
            non_monotonic: self.non_monotonic,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 样本摘要
#[derive(Debug, Clone, Default)]
pub struct SampleSummary {
    pub total_samples: u64,
    pub rate_hz: f64,
    pub x: StatsSummary,
    pub y: StatsSummary,
    pub z: StatsSummary,
    pub magnitude: StatsSummary,
    pub interval_ms: StatsSummary,
    pub non_monotonic: u64,
}

impl std::fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Gyro Sample Summary ===")?;
        writeln!(f, "Total samples: {}", self.total_samples)?;
        writeln!(f, "Effective rate: {:.1} Hz", self.rate_hz)?;
        writeln!(f, "X (rad/s): {}", self.x)?;
        writeln!(f, "Y (rad/s): {}", self.y)?;
        writeln!(f, "Z (rad/s): {}", self.z)?;
        writeln!(f, "|w| (rad/s): {}", self.magnitude)?;
        writeln!(f, "Interval (ms): {}", self.interval_ms)?;
        if self.non_monotonic > 0 {
            writeln!(f, "Non-monotonic timestamps: {}", self.non_monotonic)?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.4}, max={:.4}, mean={:.4}, std={:.4} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
