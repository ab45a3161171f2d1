use lumen_transport::QueryStatus;

/// Everything `query_status` reports (`spec.md` §6): transport state and
/// counters, plus the two process-lifetime flags a diagnostic client cares
/// about.
#[derive(Debug, Clone)]
pub struct Status {
    pub transport: QueryStatus,
    pub session_active: bool,
    pub animation_running: bool,
}
