use super::TaxPolicy;

use rust_decimal_macros::dec;

fn policy() -> TaxPolicy {
    TaxPolicy::new(5)
}

#[test]
fn test_gross_110_at_ten_percent_splits_into_100_and_10() {
    let breakdown = policy().from_gross(dec!(110), dec!(10));

    assert_eq!(breakdown.tax, dec!(10.00000));
    assert_eq!(breakdown.net, dec!(100.00000));
    assert_eq!(breakdown.gross, dec!(110));
}

#[test]
fn test_net_100_at_ten_percent_costs_gross_110() {
    let breakdown = policy().from_net(dec!(100), dec!(10));

    assert_eq!(breakdown.tax, dec!(10.00000));
    assert_eq!(breakdown.gross, dec!(110.00000));
    assert_eq!(breakdown.net, dec!(100));
}

#[test]
fn test_fractional_tax_is_rounded_toward_the_tax_account() {
    // 100 * 0.1 / 1.1 = 9.0909... -> rounds up, never down
    let breakdown = policy().from_gross(dec!(100), dec!(10));

    assert_eq!(breakdown.tax, dec!(9.09091));
    assert_eq!(breakdown.net, dec!(90.90909));
}

#[test]
fn test_rounding_never_decreases_the_tax() {
    let policy = policy();
    let samples = [dec!(0.01), dec!(1), dec!(3.33), dec!(99.99), dec!(1234.56789)];

    for net in samples {
        let exact = net * dec!(7) / dec!(100);
        assert!(policy.net_to_tax(net, dec!(7)) >= exact);
    }
}

#[test]
fn test_zero_percent_keeps_gross_and_net_identical() {
    let breakdown = policy().from_gross(dec!(42.42), dec!(0));

    assert!(breakdown.tax.is_zero());
    assert_eq!(breakdown.net, dec!(42.42));
}

#[test]
fn test_rates_above_one_hundred_percent_are_supported() {
    // p = 1.5: the tax on a net amount exceeds the amount itself.
    let breakdown = policy().from_net(dec!(100), dec!(150));

    assert_eq!(breakdown.tax, dec!(150.00000));
    assert_eq!(breakdown.gross, dec!(250.00000));
}

#[test]
fn test_sent_minus_tax_equals_received_for_both_directions() {
    let policy = policy();

    for percent in [dec!(0), dec!(7), dec!(10), dec!(19), dec!(150)] {
        let from_gross = policy.from_gross(dec!(123.45), percent);
        assert_eq!(from_gross.gross - from_gross.tax, from_gross.net);

        let from_net = policy.from_net(dec!(123.45), percent);
        assert_eq!(from_net.gross - from_net.tax, from_net.net);
    }
}

#[test]
fn test_rounding_precision_is_configurable() {
    let coarse = TaxPolicy::new(2);

    // 100 * 0.1 / 1.1 = 9.0909... -> 9.10 at two places
    assert_eq!(coarse.gross_to_tax(dec!(100), dec!(10)), dec!(9.10));
}
