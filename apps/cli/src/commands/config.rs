//! 配置管理命令
//!
//! 持久化操作员设置（链路、后端地址、阈值等），`run` 启动时读取，
//! 命令行参数可逐项覆盖。

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件路径
fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("vizible");
    Ok(path)
}

fn config_file() -> Result<PathBuf> {
    let mut path = config_dir()?;
    fs::create_dir_all(&path).context("创建配置目录失败")?;

    path.push("config.toml");
    Ok(path)
}

/// CLI 配置（`[default]` 一节）
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Defaults {
    /// 串口设备路径（如 /dev/rfcomm0）
    pub device: Option<String>,

    /// 串口波特率
    pub baud: Option<u32>,

    /// 检测服务基地址
    pub server_url: Option<String>,

    /// 障碍判定阈值（厘米）
    pub threshold_cm: Option<u32>,

    /// 检测请求时限（毫秒）
    pub timeout_ms: Option<u64>,
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub default: Defaults,
}

impl CliConfig {
    /// 加载配置
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("读取配置文件失败")?;
        toml::from_str(&content).context("解析配置文件失败")
    }

    /// 保存配置
    fn save(&self) -> Result<()> {
        self.save_to(&config_file()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).context("写入配置文件失败")?;

        Ok(())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 串口设备路径（如 /dev/rfcomm0）
        #[arg(short, long)]
        device: Option<String>,

        /// 串口波特率
        #[arg(short, long)]
        baud: Option<u32>,

        /// 检测服务基地址
        #[arg(short, long)]
        server_url: Option<String>,

        /// 障碍判定阈值（厘米）
        #[arg(short, long)]
        threshold: Option<u32>,

        /// 检测请求时限（毫秒）
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                device,
                baud,
                server_url,
                threshold,
                timeout_ms,
            } => Self::set_(device, baud, server_url, threshold, timeout_ms),

            ConfigCommand::Get { key } => Self::get_(key),

            ConfigCommand::Check => Self::check_(),
        }
    }

    fn set_(
        device: Option<String>,
        baud: Option<u32>,
        server_url: Option<String>,
        threshold: Option<u32>,
        timeout_ms: Option<u64>,
    ) -> Result<()> {
        let mut config = CliConfig::load()?;

        if let Some(ref d) = device {
            config.default.device = Some(d.clone());
            println!("✅ 设置串口设备: {}", d);
        }

        if let Some(b) = baud {
            config.default.baud = Some(b);
            println!("✅ 设置波特率: {}", b);
        }

        if let Some(ref url) = server_url {
            config.default.server_url = Some(url.clone());
            println!("✅ 设置检测服务: {}", url);
        }

        if let Some(t) = threshold {
            config.default.threshold_cm = Some(t);
            println!("✅ 设置障碍阈值: {} cm", t);
        }

        if let Some(t) = timeout_ms {
            config.default.timeout_ms = Some(t);
            println!("✅ 设置请求时限: {} ms", t);
        }

        config.save()?;
        Ok(())
    }

    fn get_(key: String) -> Result<()> {
        let config = CliConfig::load()?;

        let print_opt = |value: Option<String>| match value {
            Some(v) => println!("{}", v),
            None => println!("(未设置)"),
        };

        match key.as_str() {
            "device" => print_opt(config.default.device),
            "baud" => print_opt(config.default.baud.map(|b| b.to_string())),
            "server_url" => print_opt(config.default.server_url),
            "threshold_cm" => print_opt(config.default.threshold_cm.map(|t| t.to_string())),
            "timeout_ms" => print_opt(config.default.timeout_ms.map(|t| t.to_string())),

            _ => {
                println!("Vizible CLI 配置:");
                println!("  设备: {:?}", config.default.device);
                println!("  波特率: {:?}", config.default.baud);
                println!("  检测服务: {:?}", config.default.server_url);
                println!("  阈值: {:?}", config.default.threshold_cm);
                println!("  时限: {:?}", config.default.timeout_ms);
            },
        }

        Ok(())
    }

    fn check_() -> Result<()> {
        let config = CliConfig::load()?;
        let path = config_file()?;

        println!("配置文件: {}", path.display());
        println!("  设备: {:?}", config.default.device);
        println!("  波特率: {:?}", config.default.baud);
        println!("  检测服务: {:?}", config.default.server_url);
        println!("  阈值: {:?}", config.default.threshold_cm);
        println!("  时限: {:?}", config.default.timeout_ms);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = CliConfig {
            default: Defaults {
                device: Some("/dev/rfcomm0".to_string()),
                baud: Some(115200),
                server_url: Some("http://192.168.1.100:5000/".to_string()),
                threshold_cm: Some(125),
                timeout_ms: Some(2000),
            },
        };

        config.save_to(&path).unwrap();
        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, CliConfig::default());
    }

    #[test]
    fn test_partial_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[default]\ndevice = \"/dev/rfcomm1\"\n").unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.default.device.as_deref(), Some("/dev/rfcomm1"));
        assert_eq!(loaded.default.baud, None);
    }
}
