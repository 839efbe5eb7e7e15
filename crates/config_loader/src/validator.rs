//! 配置校验模块
//!
//! 校验规则：
//! - block_size 在 [1, MAX_BLOCK_SIZE] 之间
//! - max_line_len > 0
//! - 输出路径不能为空字符串

use contracts::{ContractError, TeeConfig, MAX_BLOCK_SIZE};

/// 校验 TeeConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &TeeConfig) -> Result<(), ContractError> {
    validate_block_size(config)?;
    validate_max_line_len(config)?;
    validate_outputs(config)?;
    Ok(())
}

/// 校验块大小
fn validate_block_size(config: &TeeConfig) -> Result<(), ContractError> {
    if config.block_size == 0 || config.block_size > MAX_BLOCK_SIZE {
        return Err(ContractError::config_validation(
            "block_size",
            format!(
                "block_size must be in 1..={MAX_BLOCK_SIZE}, got {}",
                config.block_size
            ),
        ));
    }
    Ok(())
}

/// 校验行长度上限
fn validate_max_line_len(config: &TeeConfig) -> Result<(), ContractError> {
    if config.max_line_len == 0 {
        return Err(ContractError::config_validation(
            "max_line_len",
            "max_line_len must be > 0",
        ));
    }
    Ok(())
}

/// 校验输出路径
fn validate_outputs(config: &TeeConfig) -> Result<(), ContractError> {
    for (idx, path) in config.outputs.iter().enumerate() {
        if path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                format!("outputs[{idx}]"),
                "output path cannot be empty",
            ));
        }
    }
    Ok(())
}
