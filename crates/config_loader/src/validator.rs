//! 配置校验模块
//!
//! 校验规则：
//! - 1 <= reader.capacity <= MAX_READER_CAPACITY
//! - scale 各轴为有限非零值
//! - 轴事件码互不相同
//! - 设备路径与输入设备名非空

use contracts::{Axis, ContractError, DriverConfig, MAX_READER_CAPACITY};

/// 校验 DriverConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &DriverConfig) -> Result<(), ContractError> {
    validate_reader(config)?;
    validate_scale(config)?;
    validate_axes(config)?;
    validate_device(config)?;
    Ok(())
}

/// 校验读取缓冲容量
fn validate_reader(config: &DriverConfig) -> Result<(), ContractError> {
    if config.reader.capacity == 0 {
        return Err(ContractError::config_validation(
            "reader.capacity",
            "capacity must be >= 1",
        ));
    }
    if config.reader.capacity > MAX_READER_CAPACITY {
        return Err(ContractError::config_validation(
            "reader.capacity",
            format!(
                "capacity must be <= {MAX_READER_CAPACITY}, got {}",
                config.reader.capacity
            ),
        ));
    }
    Ok(())
}

/// 校验换算系数
fn validate_scale(config: &DriverConfig) -> Result<(), ContractError> {
    for axis in Axis::ALL {
        let value = config.scale.get(axis);
        if !value.is_finite() || value == 0.0 {
            return Err(ContractError::config_validation(
                format!("scale.{}", axis_name(axis)),
                format!("scale must be finite and non-zero, got {value}"),
            ));
        }
    }
    Ok(())
}

/// 校验轴事件码唯一
fn validate_axes(config: &DriverConfig) -> Result<(), ContractError> {
    let axes = &config.axes;
    if !axes.is_distinct() {
        return Err(ContractError::config_validation(
            "axes",
            format!(
                "duplicate axis event code (x={}, y={}, z={})",
                axes.x, axes.y, axes.z
            ),
        ));
    }
    Ok(())
}

/// 校验设备节点配置
fn validate_device(config: &DriverConfig) -> Result<(), ContractError> {
    let device = &config.device;
    if device.control_path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "device.control_path",
            "control_path cannot be empty",
        ));
    }
    if device.input_name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "device.input_name",
            "input_name cannot be empty",
        ));
    }
    if let Some(path) = &device.input_path {
        if path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                "device.input_path",
                "input_path cannot be empty when set",
            ));
        }
    }
    Ok(())
}

fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&DriverConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = DriverConfig::default();
        config.reader.capacity = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "reader.capacity");
    }

    #[test]
    fn test_capacity_upper_bound() {
        let mut config = DriverConfig::default();
        config.reader.capacity = MAX_READER_CAPACITY;
        assert!(validate(&config).is_ok());

        config.reader.capacity = MAX_READER_CAPACITY + 1;
        assert_eq!(field_of(validate(&config).unwrap_err()), "reader.capacity");
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut config = DriverConfig::default();
        config.scale.y = 0.0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "scale.y");
    }

    #[test]
    fn test_non_finite_scale_rejected() {
        let mut config = DriverConfig::default();
        config.scale.z = f32::NAN;
        assert_eq!(field_of(validate(&config).unwrap_err()), "scale.z");
    }

    #[test]
    fn test_negative_scale_allowed() {
        let mut config = DriverConfig::default();
        config.scale.x = -config.scale.x;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_axis_codes_rejected() {
        let mut config = DriverConfig::default();
        config.axes.z = config.axes.x;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_device_fields_rejected() {
        let mut config = DriverConfig::default();
        config.device.input_name = "  ".to_string();
        assert_eq!(field_of(validate(&config).unwrap_err()), "device.input_name");

        let mut config = DriverConfig::default();
        config.device.control_path = PathBuf::new();
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "device.control_path"
        );

        let mut config = DriverConfig::default();
        config.device.input_path = Some(PathBuf::new());
        assert_eq!(field_of(validate(&config).unwrap_err()), "device.input_path");
    }
}
