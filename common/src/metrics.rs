use metrics::{Unit, describe_counter, describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    describe_gauge!(names::COMPONENT_INFO, "Basic information about the component");

    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown");
    gauge!(names::COMPONENT_INFO, "component" => name, "version" => version).set(1);
}

/// Registers descriptions for every counter the pipeline emits.
pub fn describe_pipeline_metrics() {
    describe_counter!(
        names::ENTITIES_RECEIVED,
        Unit::Count,
        "Number of entities requested from the series source"
    );
    describe_counter!(
        names::ENTITIES_PROCESSED,
        Unit::Count,
        "Number of entities successfully analysed"
    );
    describe_counter!(
        names::ENTITIES_SKIPPED,
        Unit::Count,
        "Number of entities skipped because their series was unavailable"
    );
    describe_counter!(
        names::EVENTS_DETECTED,
        Unit::Count,
        "Number of events retained after minimum-separation filtering"
    );
    describe_counter!(
        names::FAILURES,
        Unit::Count,
        "Number of failures encountered"
    );
}

pub mod names {
    pub const COMPONENT_INFO: &str = "series_events_component_info";
    pub const ENTITIES_RECEIVED: &str = "series_events_entities_received";
    pub const ENTITIES_PROCESSED: &str = "series_events_entities_processed";
    pub const ENTITIES_SKIPPED: &str = "series_events_entities_skipped";
    pub const EVENTS_DETECTED: &str = "series_events_events_detected";
    pub const FAILURES: &str = "series_events_failures";
}

pub mod failures {
    use strum::IntoStaticStr;

    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, IntoStaticStr)]
    #[strum(serialize_all = "snake_case")]
    pub enum FailureKind {
        Configuration,
        InsufficientData,
        DegenerateInput,
        IdentityOutOfRange,
        FileWriteFailed,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        ("failure_kind", failure_kind.into())
    }

}
