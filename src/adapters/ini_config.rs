//! INI file configuration adapter.
//!
//! Assembles a typed [`EngineConfig`] from an INI file; structural validation
//! (period ordering, checkpoint ordering, stop-fraction sign) happens in
//! `Engine::new`.
//!
//! ```ini
//! [engine]
//! account = 40098981
//! universe = 510300.SH, 510500.SH, 159915.SZ
//! max_positions = 5
//! ranking = spread          ; or: return
//! return_lookback = 10
//!
//! [oscillator]
//! fast = 12
//! slow = 26
//! signal = 9
//!
//! [stop]
//! policy = fixed            ; or: volatility
//! fraction = -0.02
//! period = 14
//! multiplier = 3.0
//!
//! [schedule]
//! open = 09:31
//! entry = 14:46
//! reversal = 14:55
//! monitor_start = 09:32
//! monitor_end = 14:59
//! ```

use chrono::NaiveTime;
use configparser::ini::Ini;
use std::path::Path;

use crate::domain::config::{
    parse_universe, EngineConfig, RankingMetric, StopPolicy, DEFAULT_LOT_SIZE,
};
use crate::domain::error::EngineError;
use crate::domain::indicator::oscillator::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, EngineError> {
    let path = path.as_ref();
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| EngineError::ConfigParse {
        file: path.display().to_string(),
        reason: e,
    })?;
    from_ini(&ini)
}

pub fn from_str(content: &str) -> Result<EngineConfig, EngineError> {
    let mut ini = Ini::new();
    ini.read(content.to_string())
        .map_err(|reason| EngineError::ConfigParse {
            file: "<inline>".into(),
            reason,
        })?;
    from_ini(&ini)
}

fn missing(section: &str, key: &str) -> EngineError {
    EngineError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    }
}

fn invalid(section: &str, key: &str, reason: impl std::fmt::Display) -> EngineError {
    EngineError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.to_string(),
    }
}

fn get_usize(ini: &Ini, section: &str, key: &str, default: usize) -> Result<usize, EngineError> {
    match ini.getint(section, key) {
        Ok(Some(v)) if v > 0 => Ok(v as usize),
        Ok(Some(v)) => Err(invalid(section, key, format!("{v} is not positive"))),
        Ok(None) => Ok(default),
        Err(e) => Err(invalid(section, key, e)),
    }
}

fn get_f64(ini: &Ini, section: &str, key: &str, default: f64) -> Result<f64, EngineError> {
    match ini.getfloat(section, key) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Ok(default),
        Err(e) => Err(invalid(section, key, e)),
    }
}

fn get_time(ini: &Ini, section: &str, key: &str, default: &str) -> Result<NaiveTime, EngineError> {
    let raw = ini
        .get(section, key)
        .unwrap_or_else(|| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|e| invalid(section, key, format!("expected HH:MM, got {raw:?}: {e}")))
}

fn from_ini(ini: &Ini) -> Result<EngineConfig, EngineError> {
    let account = ini
        .get("engine", "account")
        .ok_or_else(|| missing("engine", "account"))?;
    let universe_raw = ini
        .get("engine", "universe")
        .ok_or_else(|| missing("engine", "universe"))?;
    let universe =
        parse_universe(&universe_raw).map_err(|e| invalid("engine", "universe", e))?;

    let ranking = match ini
        .get("engine", "ranking")
        .unwrap_or_else(|| "spread".to_string())
        .to_lowercase()
        .as_str()
    {
        "spread" => RankingMetric::OscillatorSpread,
        "return" => RankingMetric::Return {
            lookback: get_usize(ini, "engine", "return_lookback", 10)?,
        },
        other => {
            return Err(invalid(
                "engine",
                "ranking",
                format!("expected spread or return, got {other:?}"),
            ))
        }
    };

    let stop_policy = match ini
        .get("stop", "policy")
        .unwrap_or_else(|| "fixed".to_string())
        .to_lowercase()
        .as_str()
    {
        "fixed" => StopPolicy::FixedFraction(get_f64(ini, "stop", "fraction", -0.02)?),
        "volatility" => StopPolicy::Volatility {
            period: get_usize(ini, "stop", "period", 14)?,
            multiplier: get_f64(ini, "stop", "multiplier", 3.0)?,
        },
        other => {
            return Err(invalid(
                "stop",
                "policy",
                format!("expected fixed or volatility, got {other:?}"),
            ))
        }
    };

    Ok(EngineConfig {
        account,
        universe,
        max_positions: get_usize(ini, "engine", "max_positions", 5)?,
        fast_period: get_usize(ini, "oscillator", "fast", DEFAULT_FAST)?,
        slow_period: get_usize(ini, "oscillator", "slow", DEFAULT_SLOW)?,
        signal_period: get_usize(ini, "oscillator", "signal", DEFAULT_SIGNAL)?,
        stop_policy,
        ranking,
        lot_size: get_usize(ini, "engine", "lot_size", DEFAULT_LOT_SIZE as usize)? as i64,
        fallback_capital: get_f64(ini, "engine", "fallback_capital", 1_000_000.0)?,
        open_time: get_time(ini, "schedule", "open", "09:31")?,
        entry_time: get_time(ini, "schedule", "entry", "14:46")?,
        reversal_time: get_time(ini, "schedule", "reversal", "14:55")?,
        monitor_start: get_time(ini, "schedule", "monitor_start", "09:32")?,
        monitor_end: get_time(ini, "schedule", "monitor_end", "14:59")?,
    })
}
