//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 字节流 -> 读取器 -> 驱动门面的端到端测试（无需硬件）
//! - 配置文件到驱动实例的装配测试

#[cfg(test)]
mod contract_tests {
    use contracts::{DriverError, GyroSample, GYRO_HANDLE, INPUT_EVENT_SIZE};

    #[test]
    fn test_input_event_record_layout() {
        // struct timeval (16) + type (2) + code (2) + value (4)
        assert_eq!(INPUT_EVENT_SIZE, 24);
    }

    #[test]
    fn test_sample_defaults() {
        let sample = GyroSample::default();
        assert_eq!(sample.handle, GYRO_HANDLE);
        assert_eq!(sample.timestamp_ns, 0);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DriverError::invalid_argument("x").status(), -22);
        assert_eq!(DriverError::StreamRead { errno: 5 }.status(), -5);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::{Cursor, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use contracts::{
        CalibrationOffsets, ConversionScale, DriverConfig, DriverError, EventSource, GyroSample,
        RawEvent, Vector3, EV_ABS, EV_KEY, EV_REL, REL_RX, REL_RY, REL_RZ,
    };
    use driver::{
        DeviceState, GyroSensor, MockConfig, MockDevice, OfflineControl, SensorDriver, StepClock,
    };
    use ingestion::InputReader;
    use observability::SampleStatsAggregator;
    use rand::Rng;

    fn encode(events: &[RawEvent]) -> Vec<u8> {
        events
            .iter()
            .enumerate()
            .flat_map(|(i, e)| e.to_record(1, i as i64).as_bytes().to_vec())
            .collect()
    }

    fn config_with_scale(scale: ConversionScale) -> DriverConfig {
        DriverConfig {
            scale,
            ..Default::default()
        }
    }

    fn stream_sensor(
        config: &DriverConfig,
        bytes: Vec<u8>,
    ) -> GyroSensor<MockDevice, InputReader<Cursor<Vec<u8>>>, StepClock> {
        GyroSensor::new(
            config,
            MockDevice::new(),
            InputReader::new(Cursor::new(bytes), config.reader.capacity),
            StepClock::new(0, 5_000_000),
        )
    }

    fn drain<D, S, C>(sensor: &mut GyroSensor<D, S, C>, batch: usize) -> Vec<GyroSample>
    where
        D: driver::DeviceControl,
        S: EventSource,
        C: contracts::MonotonicClock,
    {
        let mut out = Vec::new();
        let mut buf = vec![GyroSample::default(); batch];
        loop {
            let n = sensor.read_events(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
            if n == 0 && sensor.source().is_exhausted() && !sensor.has_pending_events() {
                break;
            }
        }
        out
    }

    /// Byte stream -> InputReader -> GyroSensor with calibrated conversion
    #[test]
    fn test_calibrated_sample_from_byte_stream() {
        let scale = ConversionScale::new(0.5, 0.25, 2.0);
        let bytes = encode(&[
            RawEvent::relative(REL_RX, 100),
            RawEvent::relative(REL_RY, 200),
            RawEvent::relative(REL_RZ, 300),
            RawEvent::sync(),
        ]);

        let mut sensor = stream_sensor(&config_with_scale(scale), bytes)
            .with_calibration(CalibrationOffsets::new(10, 20, 30));
        let samples = drain(&mut sensor, 4);

        assert_eq!(samples.len(), 1);
        assert_eq!(
            samples[0].axes,
            Vector3::new(90.0 * 0.5, 180.0 * 0.25, 270.0 * 2.0)
        );
    }

    /// Repeated syncs carry the last axis state with fresh timestamps
    #[test]
    fn test_consecutive_syncs_repeat_state() {
        let bytes = encode(&[
            RawEvent::relative(REL_RX, 7),
            RawEvent::sync(),
            RawEvent::sync(),
        ]);
        let mut sensor = stream_sensor(&config_with_scale(ConversionScale::uniform(1.0)), bytes);
        let samples = drain(&mut sensor, 8);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].axes, samples[1].axes);
        assert!(samples[1].timestamp_ns > samples[0].timestamp_ns);
    }

    /// Output capacity bounds every call; leftovers stay buffered
    #[test]
    fn test_capacity_bounds_each_read() {
        let events: Vec<RawEvent> = (0..9)
            .flat_map(|i| [RawEvent::relative(REL_RZ, i), RawEvent::sync()])
            .collect();
        let mut sensor = stream_sensor(&DriverConfig::default(), encode(&events));

        let mut buf = vec![GyroSample::default(); 2];
        let mut total = 0;
        loop {
            let n = sensor.read_events(&mut buf).unwrap();
            assert!(n <= 2);
            total += n;
            if n == 0 && sensor.source().is_exhausted() && !sensor.has_pending_events() {
                break;
            }
        }
        assert_eq!(total, 9);
        assert_eq!(sensor.metrics().samples_emitted, 9);
    }

    /// A one-record ring still assembles full samples
    #[test]
    fn test_small_reader_capacity() {
        let config = DriverConfig {
            reader: contracts::ReaderConfig { capacity: 1 },
            scale: ConversionScale::uniform(1.0),
            ..Default::default()
        };
        let bytes = encode(&[
            RawEvent::relative(REL_RX, 1),
            RawEvent::relative(REL_RY, 2),
            RawEvent::sync(),
        ]);
        let mut sensor = stream_sensor(&config, bytes);
        let samples = drain(&mut sensor, 1);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].axes, Vector3::new(1.0, 2.0, 0.0));
    }

    /// Inserting unknown events never changes finalized samples
    #[test]
    fn test_unknown_events_do_not_change_samples() {
        let mut rng = rand::rng();
        let base = [
            RawEvent::relative(REL_RX, 11),
            RawEvent::relative(REL_RY, -22),
            RawEvent::relative(REL_RZ, 33),
            RawEvent::sync(),
            RawEvent::relative(REL_RY, 44),
            RawEvent::sync(),
        ];

        let mut clean = stream_sensor(&DriverConfig::default(), encode(&base));
        let expected: Vec<Vector3> = drain(&mut clean, 4).iter().map(|s| s.axes).collect();

        for _ in 0..20 {
            let mut noisy = Vec::new();
            for event in base {
                while rng.random_bool(0.4) {
                    let junk = match rng.random_range(0..3) {
                        0 => RawEvent::new(EV_KEY, rng.random_range(0..300), rng.random()),
                        1 => RawEvent::new(EV_ABS, rng.random_range(0..64), rng.random()),
                        // REL codes outside the axis mapping
                        _ => RawEvent::new(EV_REL, rng.random_range(6..16), rng.random()),
                    };
                    noisy.push(junk);
                }
                noisy.push(event);
            }

            let mut sensor = stream_sensor(&DriverConfig::default(), encode(&noisy));
            let got: Vec<Vector3> = drain(&mut sensor, 4).iter().map(|s| s.axes).collect();
            assert_eq!(got, expected);
        }
    }

    /// Full lifecycle through the HAL trait object
    #[test]
    fn test_hal_lifecycle_with_mock_device() {
        let device = MockDevice::new();
        let log = device.log();
        let bytes = encode(&[RawEvent::relative(REL_RX, 5), RawEvent::sync()]);

        let mut driver: Box<dyn SensorDriver> = Box::new(GyroSensor::new(
            &DriverConfig::default(),
            device,
            InputReader::new(Cursor::new(bytes), 8),
            StepClock::default(),
        ));
        let handle = driver.handle();

        driver.enable(handle, true).unwrap();
        driver.enable(handle, true).unwrap();
        assert_eq!(log.enable_count(), 1);

        assert!(matches!(
            driver.set_delay(handle, -1),
            Err(DriverError::InvalidArgument { .. })
        ));
        assert_eq!(log.delay_count(), 0);
        driver.set_delay(handle, 10_500_000).unwrap();
        assert_eq!(log.last_delay_ms(), 10);

        let mut empty: [GyroSample; 0] = [];
        assert!(driver.read_events(&mut empty).is_err());

        let mut buf = [GyroSample::default(); 4];
        assert_eq!(driver.read_events(&mut buf).unwrap(), 1);

        drop(driver);
        assert!(!log.hw_enabled());
        assert_eq!(log.close_count(), 1);
    }

    /// Failed enable leaves the sensor disabled and is retried on the next call
    #[test]
    fn test_enable_failure_then_recovery() {
        let device = MockDevice::with_config(MockConfig {
            fail_enable: Some(16),
            ..Default::default()
        });
        let config_handle = device.config_handle();
        let mut sensor = GyroSensor::new(
            &DriverConfig::default(),
            device,
            ingestion::MockEventSource::new(),
            StepClock::default(),
        );

        let err = sensor.enable(true).unwrap_err();
        assert_eq!(err.errno(), 16);
        assert_eq!(sensor.state(), DeviceState::HandleOpenDisabled);

        config_handle.lock().unwrap().fail_enable = None;
        sensor.enable(true).unwrap();
        assert_eq!(sensor.state(), DeviceState::HandleOpenEnabled);
    }

    /// Config file -> loader -> replay sensor over a captured stream
    #[test]
    fn test_config_file_to_replay() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.bin");
        std::fs::write(
            &capture,
            encode(&[
                RawEvent::relative(REL_RX, 1010),
                RawEvent::relative(REL_RZ, -990),
                RawEvent::sync(),
            ]),
        )
        .unwrap();

        let config_path = dir.path().join("gyro.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "[device]\ninput_path = \"{}\"\n\n[scale]\nx = 0.01\ny = 0.01\nz = 0.01\n\n[reader]\ncapacity = 2",
            capture.display()
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();
        let input = config.device.input_path.clone().unwrap();

        let mut sensor = GyroSensor::new(
            &config,
            OfflineControl::new(CalibrationOffsets::new(10, 0, 10)),
            InputReader::new(std::fs::File::open(input).unwrap(), config.reader.capacity),
            driver::SystemClock,
        );
        let offsets = sensor.refresh_calibration().unwrap();
        assert_eq!(offsets, CalibrationOffsets::new(10, 0, 10));

        let samples = drain(&mut sensor, 4);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].axes.x - 10.0).abs() < 1e-4);
        assert!((samples[0].axes.z + 10.0).abs() < 1e-4);

        let mut stats = SampleStatsAggregator::new();
        stats.update(&samples[0]);
        assert_eq!(stats.summary().total_samples, 1);
    }

    /// Stream errors surface with the errno and earlier samples stay valid
    #[test]
    fn test_stream_error_propagates() {
        let source = ingestion::MockEventSource::from_events([
            RawEvent::relative(REL_RX, 1),
            RawEvent::sync(),
        ])
        .then_error(5);
        let mut sensor = GyroSensor::new(
            &DriverConfig::default(),
            MockDevice::new(),
            source,
            StepClock::default(),
        );

        let mut buf = [GyroSample::default(); 4];
        assert_eq!(sensor.read_events(&mut buf).unwrap(), 1);
        assert_eq!(
            sensor.read_events(&mut buf).unwrap_err(),
            DriverError::StreamRead { errno: 5 }
        );
        assert_eq!(sensor.metrics().stream_errors, 1);
    }

    /// A sensor can be moved onto a blocking worker and stopped by a flag
    #[tokio::test]
    async fn test_sensor_on_blocking_worker() {
        let events: Vec<RawEvent> = (0..50)
            .flat_map(|i| [RawEvent::relative(REL_RY, i), RawEvent::sync()])
            .collect();
        let mut sensor = stream_sensor(&DriverConfig::default(), encode(&events));
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let worker = tokio::task::spawn_blocking(move || {
            sensor.enable(true).unwrap();
            let mut buf = vec![GyroSample::default(); 8];
            let mut total = 0;
            while !flag.load(Ordering::Relaxed) {
                let n = sensor.read_events(&mut buf).unwrap();
                total += n;
                if n == 0 && sensor.source().is_exhausted() && !sensor.has_pending_events() {
                    break;
                }
            }
            total
        });

        assert_eq!(worker.await.unwrap(), 50);
        shutdown.store(true, Ordering::Relaxed);
    }
}
