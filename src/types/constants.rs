//! Constants of the channel fee model.

/// Flat intake each member earns per transaction crossing the channel.
pub const PER_TX_PER_MEMBER: i64 = 40;

/// Bonus added to the fee paid by the origin of a payment.
pub const SENDER_BONUS: i64 = 10_000;

/// Per-member component of the funds-time-value.
pub const AVAILABILITY_PER_MEMBER: i64 = 10;

/// Divisor turning a balance into its per-transaction time-value.
pub const INV_INTEREST_PER_TX_TIME_UNIT: i64 = 12_000_000;

/// Weight applied to the change in balance standard deviation.
pub const DEVIATION_PENALTY: f64 = 1e-5;
