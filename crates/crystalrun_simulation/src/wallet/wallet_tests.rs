//! Tests for the reward sink.

#[cfg(test)]
mod tests {
    use super::super::display::{BalanceDisplay, BALANCE_CHANNEL};
    use super::super::{BalanceChanged, Wallet};
    use crate::components::ScalarChannels;

    #[test]
    fn test_credit_reports_previous_and_current() {
        let mut wallet = Wallet::new(100);
        let change = wallet.credit(50);

        assert_eq!(
            change,
            BalanceChanged {
                previous: 100,
                current: 150
            }
        );
        assert_eq!(change.difference(), 50);
        assert_eq!(wallet.balance(), 150);
    }

    #[test]
    fn test_set_can_decrease() {
        let mut wallet = Wallet::new(100);
        let change = wallet.set(30);

        assert_eq!(change.difference(), -70);
        assert_eq!(wallet.balance(), 30);
    }

    #[test]
    fn test_credit_saturates() {
        let mut wallet = Wallet::new(i64::MAX - 1);
        wallet.credit(10);
        assert_eq!(wallet.balance(), i64::MAX);
    }

    #[test]
    fn test_shown_rounds_channel_value() {
        let channels = ScalarChannels::default().with(BALANCE_CHANNEL, 149.6);
        assert_eq!(BalanceDisplay::shown(&channels), 150);
        assert_eq!(BalanceDisplay::shown(&ScalarChannels::default()), 0);
    }
}
