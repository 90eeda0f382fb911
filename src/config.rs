use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "library.json";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// アプリケーション設定
///
/// 環境変数から起動時に一度だけ読み込む。
/// - `LIBRARY_DATA_PATH`: スナップショットファイルのパス（既定 `library.json`）
/// - `PORT`: 待ち受けポート（既定 3000）
/// - `BIND_ADDR`: 待ち受けアドレス（既定 `0.0.0.0`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub bind_addr: IpAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を組み立てる（未設定・空文字は既定値）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let data_path = get("LIBRARY_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "PORT",
                    value: value.clone(),
                    reason: e.to_string(),
                })?,
            None => defaults.port,
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "BIND_ADDR",
                    value: value.clone(),
                    reason: e.to_string(),
                })?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            data_path,
            port,
            bind_addr,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
