use calc_kit_core::loan::amortization::{
    self, build_schedule, ExtraPayment, ExtraPaymentFrequency, LoanTerms, TermUnit,
    PAYOFF_EPSILON,
};
use calc_kit_core::loan::balloon::{self, BalloonInput};
use calc_kit_core::loan::payment::{self, PaymentFrequency};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn terms(principal: Decimal, rate: Decimal, years: u32) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate: rate,
        term: years,
        term_unit: TermUnit::Years,
        frequency: PaymentFrequency::Monthly,
        extra_payment: None,
        start_date: None,
    }
}

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_reference_thirty_year_six_percent() {
    let out = amortization::simulate(&terms(dec!(300000), dec!(0.06), 30)).unwrap();
    let r = out.result;
    assert_eq!(r.fixed_payment.round_dp(2), dec!(1798.65));
    assert_eq!(r.payoff_periods, 360);
    assert!(
        (r.total_interest - dec!(347514.57)).abs() < dec!(0.01),
        "Expected total interest ~347,514.57, got {}",
        r.total_interest
    );
    assert!(out.warnings.is_empty());
}

#[test]
fn test_reference_zero_rate() {
    let r = amortization::simulate(&terms(dec!(300000), Decimal::ZERO, 30))
        .unwrap()
        .result;
    assert_eq!(r.fixed_payment, dec!(300000) / dec!(360));
    assert_eq!(r.total_interest, Decimal::ZERO);
    assert_eq!(r.interest_burden.label, "Low");
}

#[test]
fn test_reference_extra_two_hundred_monthly() {
    let mut t = terms(dec!(200000), dec!(0.05), 15);
    t.extra_payment = Some(ExtraPayment {
        amount: dec!(200),
        frequency: ExtraPaymentFrequency::Monthly,
    });
    let r = amortization::simulate(&t).unwrap().result;
    assert!(r.payoff_periods < 180, "payoff took {} periods", r.payoff_periods);
    assert!(r.total_interest < r.baseline.baseline_total_interest);
    assert!(r.baseline.interest_saved > Decimal::ZERO);
}

#[test]
fn test_total_paid_is_sum_of_payments() {
    let mut t = terms(dec!(150000), dec!(0.045), 20);
    t.extra_payment = Some(ExtraPayment {
        amount: dec!(2500),
        frequency: ExtraPaymentFrequency::Yearly,
    });
    let r = amortization::simulate(&t).unwrap().result;
    let summed: Decimal = r.schedule.iter().map(|e| e.payment).sum();
    assert!((summed - r.total_paid).abs() < dec!(0.000001));
    assert_eq!(r.total_paid, r.total_interest + r.total_principal + r.total_extra);
}

#[test]
fn test_schedule_matches_closed_form_balance() {
    let rate = payment::periodic_rate(dec!(0.07), PaymentFrequency::Monthly);
    let level = payment::fixed_payment(dec!(250000), rate, 360).unwrap();
    let schedule = build_schedule(dec!(250000), rate, level, 360, 12, None);
    assert!(schedule.is_paid_off());
    for k in [12u32, 60, 180, 300] {
        let closed = payment::remaining_balance(dec!(250000), rate, level, k).unwrap();
        let simulated = schedule.entries[(k - 1) as usize].remaining_balance;
        assert!(
            (closed - simulated).abs() < dec!(0.0001),
            "period {k}: closed form {closed} vs schedule {simulated}"
        );
    }
}

#[test]
fn test_biweekly_payments_amortize() {
    let mut t = terms(dec!(300000), dec!(0.06), 30);
    t.frequency = PaymentFrequency::Biweekly;
    let r = amortization::simulate(&t).unwrap().result;
    assert_eq!(r.scheduled_periods, 780);
    assert!(r.schedule.last().unwrap().remaining_balance <= PAYOFF_EPSILON);
}

#[test]
fn test_truncated_schedule_is_not_paid_off() {
    let rate = payment::periodic_rate(dec!(0.07), PaymentFrequency::Monthly);
    let level = payment::fixed_payment(dec!(250000), rate, 360).unwrap();
    let schedule = build_schedule(dec!(250000), rate, level, 120, 12, None);
    assert!(!schedule.is_paid_off());
    assert_eq!(schedule.payoff_periods, 120);
}

#[test]
fn test_balloon_total_cost() {
    let out = balloon::calculate_balloon(&BalloonInput {
        principal: dec!(100000),
        annual_rate: dec!(0.06),
        amortization_years: 30,
        balloon_after_years: 5,
        frequency: PaymentFrequency::Monthly,
    })
    .unwrap()
    .result;
    let closed =
        payment::remaining_balance(dec!(100000), dec!(0.005), out.regular_payment, 60).unwrap();
    assert!((out.balloon_payment - closed).abs() < dec!(0.0001));
    assert_eq!(out.total_paid, out.total_regular_payments + out.balloon_payment);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn frequency_strategy() -> impl Strategy<Value = PaymentFrequency> {
    prop_oneof![
        Just(PaymentFrequency::Weekly),
        Just(PaymentFrequency::Biweekly),
        Just(PaymentFrequency::Semimonthly),
        Just(PaymentFrequency::Monthly),
        Just(PaymentFrequency::Quarterly),
        Just(PaymentFrequency::Semiannual),
        Just(PaymentFrequency::Annual),
    ]
}

fn term_strategy() -> impl Strategy<Value = (u32, TermUnit)> {
    prop_oneof![
        (1u32..=30).prop_map(|years| (years, TermUnit::Years)),
        (1u32..=360).prop_map(|months| (months, TermUnit::Months)),
    ]
}

fn extra_strategy() -> impl Strategy<Value = Option<ExtraPayment>> {
    proptest::option::of((1i64..5_000, extra_frequency_strategy()).prop_map(
        |(amount, frequency)| ExtraPayment {
            amount: Decimal::from(amount),
            frequency,
        },
    ))
}

fn extra_frequency_strategy() -> impl Strategy<Value = ExtraPaymentFrequency> {
    prop_oneof![
        Just(ExtraPaymentFrequency::Monthly),
        Just(ExtraPaymentFrequency::Yearly),
        Just(ExtraPaymentFrequency::OneTime),
    ]
}

/// Loans over every payment frequency and term unit, without extra payments.
fn loan_strategy() -> impl Strategy<Value = LoanTerms> {
    (
        1_000i64..1_000_000,
        0i64..1500,
        term_strategy(),
        frequency_strategy(),
    )
        .prop_map(|(principal, rate_bp, (term, term_unit), frequency)| LoanTerms {
            principal: Decimal::from(principal),
            annual_rate: Decimal::new(rate_bp, 4),
            term,
            term_unit,
            frequency,
            extra_payment: None,
            start_date: None,
        })
}

fn loan_with_extra_strategy() -> impl Strategy<Value = LoanTerms> {
    (loan_strategy(), extra_strategy()).prop_map(|(mut t, extra)| {
        t.extra_payment = extra;
        t
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_no_extra_total_paid_is_level_payment_times_n(t in loan_strategy()) {
        let r = amortization::simulate(&t).unwrap().result;
        let expected = r.fixed_payment * Decimal::from(r.scheduled_periods);
        prop_assert!((r.total_paid - expected).abs() < dec!(0.01));
        prop_assert!((r.total_interest - (r.total_paid - r.total_principal)).abs() < dec!(0.000001));
        prop_assert!((r.total_paid - t.principal - r.total_interest).abs() < dec!(0.01));
    }

    #[test]
    fn prop_balance_non_increasing_and_paid_off(t in loan_with_extra_strategy()) {
        let r = amortization::simulate(&t).unwrap().result;
        let mut previous = t.principal;
        for entry in &r.schedule {
            prop_assert!(entry.remaining_balance <= previous);
            prop_assert!(entry.remaining_balance >= Decimal::ZERO);
            prop_assert!(entry.extra_payment >= Decimal::ZERO);
            previous = entry.remaining_balance;
        }
        prop_assert!(previous <= PAYOFF_EPSILON);
        prop_assert!(r.payoff_periods <= r.scheduled_periods);
    }

    #[test]
    fn prop_extra_payment_never_costs_more(
        t in loan_strategy(),
        extra in 1i64..5_000,
        freq in extra_frequency_strategy(),
    ) {
        let baseline = amortization::simulate(&t).unwrap().result;
        let mut with_extra = t.clone();
        with_extra.extra_payment = Some(ExtraPayment { amount: Decimal::from(extra), frequency: freq });
        let r = amortization::simulate(&with_extra).unwrap().result;
        prop_assert!(r.total_interest <= baseline.total_interest);
        prop_assert!(r.payoff_periods <= baseline.payoff_periods);

        let mut previous = t.principal;
        for (entry, base) in r.schedule.iter().zip(&baseline.schedule) {
            prop_assert!(entry.remaining_balance <= previous);
            prop_assert!(entry.remaining_balance >= Decimal::ZERO);
            prop_assert!(entry.remaining_balance <= base.remaining_balance);
            previous = entry.remaining_balance;
        }
    }

    #[test]
    fn prop_simulation_is_idempotent(t in loan_with_extra_strategy()) {
        let a = amortization::simulate(&t).unwrap().result;
        let b = amortization::simulate(&t).unwrap().result;
        prop_assert_eq!(a.schedule, b.schedule);
        prop_assert_eq!(a.total_interest, b.total_interest);
    }
}
