pub mod alert_dispatcher;
pub mod evaluate;
pub mod fatigue;
pub mod flags;
pub mod funnel_leaks;
pub mod import;
pub mod recommendations;
pub mod report;
pub mod strikes;
