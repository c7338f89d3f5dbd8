//! # Behaviour Emission
//!
//! Class blocks for behaviour nodes and the keyword arguments passed when a
//! behaviour is constructed in `main()`.

use super::literal::python_number;
use crate::graph::{BehaviourData, BehaviourType, StartMode};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

/// Class definition for a behaviour: the user's code for the selected type
/// if present, otherwise a stub with no-op lifecycle methods.
pub fn behaviour_class_block(class_name: &str, behaviour: &BehaviourData) -> String {
    if let Some(code) = behaviour.user_code() {
        return code.trim_end().to_string();
    }

    let base = behaviour.behaviour_type.as_str();
    match behaviour.behaviour_type {
        BehaviourType::Fsm => format!(
            "class {}({}):\n    async def on_start(self):\n        pass\n\n    async def on_end(self):\n        pass",
            class_name, base
        ),
        _ => format!(
            "class {}({}):\n    async def run(self):\n        pass",
            class_name, base
        ),
    }
}

/// When a timed behaviour should first fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartTime {
    /// Wall-clock time without a zone.
    Local(NaiveDateTime),
    /// Instant given with a UTC offset.
    Utc(DateTime<Utc>),
    /// Seconds after the agent program starts.
    After(f64),
}

impl StartTime {
    pub fn to_python(&self) -> String {
        match self {
            StartTime::Local(at) => format!("datetime.datetime({})", datetime_fields(at)),
            StartTime::Utc(at) => format!(
                "datetime.datetime({}, tzinfo=datetime.timezone.utc)",
                datetime_fields(&at.naive_utc())
            ),
            StartTime::After(seconds) => format!(
                "datetime.datetime.now() + datetime.timedelta(seconds={})",
                python_number(*seconds)
            ),
        }
    }
}

fn datetime_fields(at: &NaiveDateTime) -> String {
    let mut fields = format!(
        "{}, {}, {}, {}, {}, {}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    );
    let micros = at.nanosecond() / 1_000;
    if micros != 0 {
        fields.push_str(&format!(", {}", micros));
    }
    fields
}

/// Parses an ISO-8601 timestamp as produced by date-time form inputs.
pub fn parse_iso_timestamp(text: &str) -> Option<StartTime> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(StartTime::Utc(at.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(StartTime::Local)
}

fn valid_offset(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// Resolves the behaviour's start time. A missing mode means absolute.
/// Malformed or negative values resolve to `None` so the argument is left out.
pub fn start_time(behaviour: &BehaviourData) -> Option<StartTime> {
    match behaviour.start_mode.unwrap_or(StartMode::Absolute) {
        StartMode::Absolute => behaviour.start_at.as_deref().and_then(parse_iso_timestamp),
        StartMode::Relative => behaviour
            .start_offset
            .and_then(valid_offset)
            .map(StartTime::After),
    }
}

/// Keyword arguments for the behaviour constructor, in emission order.
/// `template_var` is always last.
pub fn constructor_args(behaviour: &BehaviourData, template_var: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();

    match behaviour.behaviour_type {
        BehaviourType::Periodic => {
            if let Some(period) = behaviour.period.filter(|p| p.is_finite() && *p > 0.0) {
                args.push(format!("period={}", python_number(period)));
            }
            if let Some(start) = start_time(behaviour) {
                args.push(format!("start_at={}", start.to_python()));
            }
        }
        BehaviourType::Timeout => {
            if let Some(start) = start_time(behaviour) {
                args.push(format!("start_at={}", start.to_python()));
            }
        }
        BehaviourType::Cyclic | BehaviourType::OneShot | BehaviourType::Fsm => {}
    }

    if let Some(template_var) = template_var {
        args.push(format!("template={}", template_var));
    }

    args
}

/// Whether constructing this behaviour needs the `datetime` module.
pub fn uses_datetime(behaviour: &BehaviourData) -> bool {
    matches!(
        behaviour.behaviour_type,
        BehaviourType::Periodic | BehaviourType::Timeout
    ) && start_time(behaviour).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn behaviour(behaviour_type: BehaviourType) -> BehaviourData {
        BehaviourData {
            class_name: "Tick".into(),
            behaviour_type,
            ..Default::default()
        }
    }

    #[test]
    fn stub_class_extends_behaviour_type() {
        let block = behaviour_class_block("Tick", &behaviour(BehaviourType::OneShot));
        assert_eq!(block, "class Tick(OneShotBehaviour):\n    async def run(self):\n        pass");
    }

    #[test]
    fn fsm_stub_has_lifecycle_hooks() {
        let block = behaviour_class_block("Machine", &behaviour(BehaviourType::Fsm));
        assert!(block.starts_with("class Machine(FSMBehaviour):"));
        assert!(block.contains("async def on_start(self):"));
        assert!(block.contains("async def on_end(self):"));
    }

    #[test]
    fn user_code_is_used_verbatim() {
        let mut data = behaviour(BehaviourType::Cyclic);
        data.config_code = BTreeMap::from([(
            "CyclicBehaviour".to_string(),
            "class Tick(CyclicBehaviour):\n    async def run(self):\n        print('x')\n\n".to_string(),
        )]);
        assert_eq!(
            behaviour_class_block("Tick", &data),
            "class Tick(CyclicBehaviour):\n    async def run(self):\n        print('x')"
        );
    }

    #[test]
    fn periodic_args_put_period_before_start() {
        let mut data = behaviour(BehaviourType::Periodic);
        data.period = Some(5.0);
        data.start_mode = Some(StartMode::Absolute);
        data.start_at = Some("2025-03-01T09:30:00".into());
        assert_eq!(
            constructor_args(&data, None),
            vec![
                "period=5".to_string(),
                "start_at=datetime.datetime(2025, 3, 1, 9, 30, 0)".to_string()
            ]
        );
    }

    #[test]
    fn relative_start_uses_timedelta() {
        let mut data = behaviour(BehaviourType::Timeout);
        data.start_mode = Some(StartMode::Relative);
        data.start_offset = Some(10.0);
        assert_eq!(
            constructor_args(&data, Some("agent1_template_1")),
            vec![
                "start_at=datetime.datetime.now() + datetime.timedelta(seconds=10)".to_string(),
                "template=agent1_template_1".to_string()
            ]
        );
    }

    #[test]
    fn invalid_offsets_drop_the_argument() {
        for offset in [-1.0, f64::NAN, f64::INFINITY] {
            let mut data = behaviour(BehaviourType::Timeout);
            data.start_mode = Some(StartMode::Relative);
            data.start_offset = Some(offset);
            assert!(constructor_args(&data, None).is_empty());
            assert!(!uses_datetime(&data));
        }
    }

    #[test]
    fn unparsable_absolute_time_drops_the_argument() {
        let mut data = behaviour(BehaviourType::Timeout);
        data.start_mode = Some(StartMode::Absolute);
        data.start_at = Some("next tuesday".into());
        assert!(constructor_args(&data, None).is_empty());
    }

    #[test]
    fn offset_timestamps_are_converted_to_utc() {
        let start = parse_iso_timestamp("2025-03-01T10:00:00.250+01:00").unwrap();
        assert_eq!(
            start.to_python(),
            "datetime.datetime(2025, 3, 1, 9, 0, 0, 250000, tzinfo=datetime.timezone.utc)"
        );
    }

    #[test]
    fn missing_mode_means_absolute() {
        let mut data = behaviour(BehaviourType::Timeout);
        data.start_at = Some("2025-03-01T09:30".into());
        data.start_offset = Some(4.0);
        assert_eq!(
            start_time(&data).map(|start| start.to_python()),
            Some("datetime.datetime(2025, 3, 1, 9, 30, 0)".to_string())
        );

        data.start_at = None;
        assert_eq!(start_time(&data), None);
    }

    #[test]
    fn untimed_types_take_only_template() {
        let mut data = behaviour(BehaviourType::Cyclic);
        data.period = Some(5.0);
        data.start_at = Some("2025-03-01T09:30".into());
        assert_eq!(constructor_args(&data, Some("t")), vec!["template=t".to_string()]);
        assert!(!uses_datetime(&data));
    }
}
