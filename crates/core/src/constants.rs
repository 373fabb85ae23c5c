/// Share of a donation reclaimable under Gift Aid, in percent.
pub const GIFT_AID_RATE_PERCENT: i64 = 25;

/// Default end of the daily giving period (20 March).
pub const DAILY_GIVING_DEFAULT_END_MONTH: u32 = 3;
pub const DAILY_GIVING_DEFAULT_END_DAY: u32 = 20;

/// Number of nights in the "last nights" giving window.
pub const LAST_NIGHTS_WINDOW: i64 = 10;

/// Attempts made to obtain a fresh donation number before giving up.
pub const MAX_NUMBER_ALLOCATION_ATTEMPTS: u32 = 5;

/// First value handed out by the donation number sequence.
pub const DONATION_NUMBER_START: i64 = 100_001;

/// Default settlement currency (ISO 4217, lower-case as the gateway expects).
pub const DEFAULT_CURRENCY: &str = "gbp";

/// HMRC schedule field limits.
pub const GIFT_AID_TITLE_MAX_CHARS: usize = 4;
pub const GIFT_AID_NAME_MAX_CHARS: usize = 35;

/// Date format used by the HMRC schedule (dd/mm/yy).
pub const GIFT_AID_DATE_FORMAT: &str = "%d/%m/%y";
