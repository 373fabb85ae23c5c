//! Daily giving scheduler - converts an amount per day and a period choice
//! into a concrete charge schedule.

mod daily_giving_model;
mod daily_giving_scheduler;


pub use daily_giving_model::{DailyGivingMode, DailyGivingPlan, DailyGivingRequest, DailySchedule};
pub use daily_giving_scheduler::{build_plan, compute_schedule, default_period_end};
