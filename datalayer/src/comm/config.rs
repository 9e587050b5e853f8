use anyhow::{anyhow, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

lazy_static! {
    static ref GLOBAL_CONFIG_MANAGER: RwLock<Option<Arc<ConfigManager>>> = RwLock::new(None);
}

/// 配置错误类型 / Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置项 '{key}' 不存在")]
    KeyNotFound { key: String },
    #[error("配置项 '{key}' 类型转换失败: {message}")]
    TypeConversionError { key: String, message: String },
    #[error("配置初始化失败: {message}")]
    InitializationError { message: String },
}

/// 配置数据源信息 / Information about a loaded source
#[derive(Debug, Clone)]
pub struct ConfigSourceInfo {
    pub source_type: String,
    pub description: String,
    pub loaded: bool,
}

/// 配置管理器 / Configuration manager
///
/// 优先级（后者覆盖前者）/ precedence, later wins:
/// `config/development.toml` < `config/default.toml` < `config/production.toml`
/// < 额外源 / extra sources < `V_` 环境变量 / env vars
pub struct ConfigManager {
    config: Config,
    sources_info: Vec<ConfigSourceInfo>,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_sources(vec![])
    }

    /// 使用额外配置源创建 / Create with extra sources
    pub fn with_sources(sources: Vec<ConfigSource>) -> Result<Self> {
        let mut builder = Config::builder();
        let mut sources_info = Vec::new();

        let defaults = ["config/development.toml", "config/default.toml", "config/production.toml"]
            .into_iter()
            .map(|path| ConfigSource::File {
                path: path.to_string(),
                format: Some(FileFormat::Toml),
                required: false,
            });
        let env = ConfigSource::Env {
            prefix: "V".to_string(),
            separator: "_",
        };

        for source in defaults.chain(sources).chain(std::iter::once(env)) {
            let mut info = source.info();
            if let ConfigSource::File { path, required, .. } = &source {
                let exists = std::path::Path::new(path).exists();
                if !exists && *required {
                    return Err(anyhow!("必需的配置文件不存在: {}", path));
                }
                if !exists {
                    sources_info.push(info);
                    continue;
                }
            }
            builder = source.add_to_builder(builder)?;
            info.loaded = true;
            sources_info.push(info);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("构建配置失败: {}", e))?;
        Ok(Self {
            config,
            sources_info,
        })
    }

    /// 获取指定 key 的配置值 / Get a value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.config
            .get(key)
            .map_err(|e| anyhow!("获取配置 '{}' 失败: {}", key, e))
    }

    /// 不存在时返回默认值 / Get a value or the default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// 区分缺失与类型错误 / Tells a missing key apart from a bad value
    pub fn get_safe<T: DeserializeOwned>(&self, key: &str) -> std::result::Result<T, ConfigError> {
        self.config.get(key).map_err(|e| match e {
            config::ConfigError::NotFound(_) => ConfigError::KeyNotFound {
                key: key.to_string(),
            },
            other => ConfigError::TypeConversionError {
                key: key.to_string(),
                message: other.to_string(),
            },
        })
    }

    pub fn exists(&self, key: &str) -> bool {
        self.config.get::<serde_json::Value>(key).is_ok()
    }

    pub fn sources_info(&self) -> &[ConfigSourceInfo] {
        &self.sources_info
    }

    /// 记录已加载的配置源 / Log which sources were loaded
    pub fn log_sources(&self) {
        for info in &self.sources_info {
            tracing::info!(
                source = %info.source_type,
                loaded = info.loaded,
                "{}",
                info.description
            );
        }
    }

    pub fn validate_required_keys(&self, keys: &[&str]) -> std::result::Result<(), ConfigError> {
        match keys.iter().find(|k| !self.exists(k)) {
            Some(key) => Err(ConfigError::KeyNotFound {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// 配置源类型 / Source kind
pub enum ConfigSource {
    File {
        path: String,
        format: Option<FileFormat>,
        required: bool,
    },
    Env {
        prefix: String,
        separator: &'static str,
    },
    /// 内存配置源（点分 key）/ in-memory source with dotted keys
    Memory(HashMap<String, serde_json::Value>),
    String {
        content: String,
        format: FileFormat,
    },
}

impl ConfigSource {
    fn info(&self) -> ConfigSourceInfo {
        let (source_type, description) = match self {
            ConfigSource::File { path, required, .. } => (
                "File",
                format!("文件配置源: {} (必需: {})", path, required),
            ),
            ConfigSource::Env { prefix, separator } => (
                "Environment",
                format!("环境变量配置源: 前缀={}, 分隔符={}", prefix, separator),
            ),
            ConfigSource::Memory(map) => ("Memory", format!("内存配置源: {} 个配置项", map.len())),
            ConfigSource::String { .. } => ("String", "字符串配置源".to_string()),
        };
        ConfigSourceInfo {
            source_type: source_type.to_string(),
            description,
            loaded: false,
        }
    }

    fn add_to_builder(
        self,
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<ConfigBuilder<config::builder::DefaultState>> {
        match self {
            ConfigSource::File {
                path,
                format,
                required,
            } => {
                let file = match format {
                    Some(format) => File::with_name(&path).format(format),
                    None => File::with_name(&path),
                };
                Ok(builder.add_source(file.required(required)))
            }
            ConfigSource::Env { prefix, separator } => Ok(builder.add_source(
                Environment::with_prefix(&prefix)
                    .separator(separator)
                    .prefix_separator("_")
                    .ignore_empty(true),
            )),
            ConfigSource::Memory(map) => {
                let mut b = builder;
                for (k, v) in map {
                    b = b
                        .set_override(k.as_str(), json_to_config(v))
                        .map_err(|e| anyhow!("内存配置失败: {}", e))?;
                }
                Ok(b)
            }
            ConfigSource::String { content, format } => {
                Ok(builder.add_source(File::from_str(&content, format)))
            }
        }
    }
}

fn json_to_config(v: serde_json::Value) -> config::Value {
    match v {
        serde_json::Value::Null => config::Value::new(None, config::ValueKind::Nil),
        serde_json::Value::Bool(b) => b.into(),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        serde_json::Value::String(s) => s.into(),
        other => other.to_string().into(),
    }
}

/// 获取全局配置管理器实例（单例）/ Global configuration manager (singleton)
pub fn get_global_config_manager() -> Result<Arc<ConfigManager>> {
    {
        let manager = GLOBAL_CONFIG_MANAGER
            .read()
            .map_err(|e| anyhow!("读取全局配置管理器锁失败: {}", e))?;
        if let Some(ref m) = *manager {
            return Ok(Arc::clone(m));
        }
    }
    let mut manager = GLOBAL_CONFIG_MANAGER
        .write()
        .map_err(|e| anyhow!("获取全局配置管理器写锁失败: {}", e))?;
    if let Some(ref m) = *manager {
        return Ok(Arc::clone(m));
    }
    let created = Arc::new(ConfigManager::new()?);
    *manager = Some(Arc::clone(&created));
    Ok(created)
}

/// 替换全局配置（启动参数或测试注入）/ Replace the global configuration
pub fn set_global_config_manager(manager: ConfigManager) -> Result<()> {
    let mut guard = GLOBAL_CONFIG_MANAGER
        .write()
        .map_err(|e| anyhow!("获取全局配置管理器写锁失败: {}", e))?;
    *guard = Some(Arc::new(manager));
    Ok(())
}

pub fn get_config<T: DeserializeOwned>(key: &str) -> Result<T> {
    get_global_config_manager()?.get(key)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigManager, ConfigSource};
    use config::FileFormat;
    use std::collections::HashMap;

    #[test]
    fn test_config_manager_new() {
        assert!(ConfigManager::new().is_ok());
    }

    #[test]
    fn test_config_from_string() {
        let source = ConfigSource::String {
            content: "[database.default]\ntype = \"sqlite\"\nmaxOpen = 4".to_string(),
            format: FileFormat::Toml,
        };
        let manager = ConfigManager::with_sources(vec![source]).unwrap();
        assert_eq!(manager.get::<String>("database.default.type").unwrap(), "sqlite");
        assert_eq!(manager.get::<i64>("database.default.maxOpen").unwrap(), 4);
        assert!(manager.validate_required_keys(&["database.default.type"]).is_ok());
        assert!(manager.validate_required_keys(&["database.audit.type"]).is_err());
    }

    #[test]
    fn test_config_from_memory() {
        let mut map = HashMap::new();
        map.insert(
            "server.host".to_string(),
            serde_json::Value::String("127.0.0.1".to_string()),
        );
        let manager = ConfigManager::with_sources(vec![ConfigSource::Memory(map)]).unwrap();
        assert_eq!(manager.get::<String>("server.host").unwrap(), "127.0.0.1");
        assert_eq!(manager.get_or("server.port", 3000i64), 3000);
    }

    #[test]
    fn test_get_safe_errors() {
        let source = ConfigSource::String {
            content: "[server]\nport = \"http\"".to_string(),
            format: FileFormat::Toml,
        };
        let manager = ConfigManager::with_sources(vec![source]).unwrap();
        assert_eq!(manager.get_safe::<String>("server.port").unwrap(), "http");
        assert!(matches!(
            manager.get_safe::<i64>("server.port"),
            Err(ConfigError::TypeConversionError { key, .. }) if key == "server.port"
        ));
        assert!(matches!(
            manager.get_safe::<i64>("server.timeout"),
            Err(ConfigError::KeyNotFound { key }) if key == "server.timeout"
        ));
    }
}
