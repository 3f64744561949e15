use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use studyplan_algo::ScheduleConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: String,
    pub scheduler: SchedulerDefaults,
}

/// Defaults applied when a request omits a field
#[derive(Debug, Clone)]
pub struct SchedulerDefaults {
    pub time_limit_ms: u64,
    /// Upper bound on any client-supplied `timeLimit`
    pub max_time_limit_ms: u64,
    pub required_hours: usize,
    pub max_daily_hours: usize,
    pub dfo_generations: usize,
    pub dfo_population: usize,
    /// Fixed seed for reproducible optimizer runs; fresh entropy when unset
    pub optimizer_seed: Option<u64>,
}

impl Default for SchedulerDefaults {
    fn default() -> Self {
        let schedule = ScheduleConfig::default();
        Self {
            time_limit_ms: schedule.time_limit_ms,
            max_time_limit_ms: 30_000,
            required_hours: schedule.required_hours,
            max_daily_hours: schedule.max_daily_hours,
            dfo_generations: 100,
            dfo_population: 50,
            optimizer_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);

        let host = env_parse("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        let defaults = SchedulerDefaults::default();
        let scheduler = SchedulerDefaults {
            time_limit_ms: env_parse("SCHEDULE_TIME_LIMIT_MS").unwrap_or(defaults.time_limit_ms),
            max_time_limit_ms: env_parse("SCHEDULE_MAX_TIME_LIMIT_MS")
                .unwrap_or(defaults.max_time_limit_ms),
            required_hours: env_parse("SCHEDULE_REQUIRED_HOURS").unwrap_or(defaults.required_hours),
            max_daily_hours: env_parse("SCHEDULE_MAX_DAILY_HOURS").unwrap_or(defaults.max_daily_hours),
            dfo_generations: env_parse("DFO_GENERATIONS").unwrap_or(defaults.dfo_generations),
            dfo_population: env_parse("DFO_POPULATION").unwrap_or(defaults.dfo_population),
            optimizer_seed: env_parse("OPTIMIZER_SEED"),
        };

        Self {
            host,
            port,
            log_level,
            file_logs,
            log_dir,
            scheduler,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            log_level: "info".to_string(),
            file_logs: false,
            log_dir: "./logs".to_string(),
            scheduler: SchedulerDefaults::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}
