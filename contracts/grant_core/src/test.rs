#![cfg(test)]

use super::{
    disabled_beneficiary, grant_address, grant_salt, is_null, null_address, Error, Grant,
};
use soroban_sdk::{testutils::Address as _, Address, Env};

// 2023-01-01 and 2027-01-01, four years including one leap day.
const START: u64 = 1_672_531_200;
const END: u64 = 1_798_761_600;
const AMOUNT: i128 = 100_000;

#[test]
fn test_new_rejects_invalid_schedules() {
    assert_eq!(Grant::new(START, END, 0), Err(Error::AmountZero));
    assert_eq!(Grant::new(START, END, -1), Err(Error::AmountZero));
    assert_eq!(Grant::new(0, END, AMOUNT), Err(Error::StartZero));
    assert_eq!(Grant::new(START, START, AMOUNT), Err(Error::EndNotAfterStart));
    assert_eq!(Grant::new(START, START - 1, AMOUNT), Err(Error::EndNotAfterStart));

    let grant = Grant::new(START, END, AMOUNT).unwrap();
    assert_eq!(grant.start_ts, START);
    assert_eq!(grant.end_ts, END);
    assert_eq!(grant.amount, AMOUNT);
}

#[test]
fn test_vested_is_zero_until_start_and_full_from_end() {
    let grant = Grant::new(START, END, AMOUNT).unwrap();

    assert_eq!(grant.vested_at(0).unwrap(), 0);
    assert_eq!(grant.vested_at(START - 1).unwrap(), 0);
    assert_eq!(grant.vested_at(START).unwrap(), 0);
    assert_eq!(grant.vested_at(END).unwrap(), AMOUNT);
    assert_eq!(grant.vested_at(END + 1).unwrap(), AMOUNT);
    assert_eq!(grant.vested_at(u64::MAX).unwrap(), AMOUNT);
}

#[test]
fn test_vested_is_linear_and_floored() {
    let grant = Grant::new(START, END, AMOUNT).unwrap();
    let duration = END - START;

    assert_eq!(grant.vested_at(START + duration / 4).unwrap(), 25_000);
    assert_eq!(grant.vested_at(START + duration / 2).unwrap(), 50_000);
    assert_eq!(grant.vested_at(START + duration * 3 / 4).unwrap(), 75_000);

    // 3 tokens over 10 seconds: 0.3 per second, always rounded down.
    let small = Grant::new(100, 110, 3).unwrap();
    assert_eq!(small.vested_at(103).unwrap(), 0);
    assert_eq!(small.vested_at(104).unwrap(), 1);
    assert_eq!(small.vested_at(109).unwrap(), 2);
    assert_eq!(small.vested_at(110).unwrap(), 3);
}

#[test]
fn test_vested_never_decreases_and_never_exceeds_amount() {
    let grant = Grant::new(START, END, AMOUNT).unwrap();
    let step = (END - START) / 997;

    let mut previous = 0;
    let mut now = START - step;
    while now <= END + step {
        let vested = grant.vested_at(now).unwrap();
        assert!(vested >= previous);
        assert!(vested <= AMOUNT);
        assert_eq!(grant.unvested_at(now).unwrap(), AMOUNT - vested);
        previous = vested;
        now += step;
    }
    assert_eq!(previous, AMOUNT);
}

#[test]
fn test_vested_reports_overflow() {
    let grant = Grant::new(1, u64::MAX, i128::MAX).unwrap();
    assert_eq!(grant.vested_at(3), Err(Error::MathOverflow));
}

#[test]
fn test_reserved_addresses() {
    let env = Env::default();
    let someone = Address::generate(&env);

    assert!(is_null(&env, &null_address(&env)));
    assert!(!is_null(&env, &someone));
    assert!(!is_null(&env, &disabled_beneficiary(&env)));
    assert_ne!(disabled_beneficiary(&env), someone);
}

#[test]
fn test_grant_salt_fingerprints_every_parameter() {
    let env = Env::default();
    let beneficiary = Address::generate(&env);
    let other = Address::generate(&env);

    let salt = grant_salt(&env, &beneficiary, START, END, AMOUNT);
    assert_eq!(salt, grant_salt(&env, &beneficiary, START, END, AMOUNT));

    assert_ne!(salt, grant_salt(&env, &other, START, END, AMOUNT));
    assert_ne!(salt, grant_salt(&env, &beneficiary, START + 1, END, AMOUNT));
    assert_ne!(salt, grant_salt(&env, &beneficiary, START, END + 1, AMOUNT));
    assert_ne!(salt, grant_salt(&env, &beneficiary, START, END, AMOUNT + 1));
}

#[test]
fn test_grant_address_depends_on_factory_and_grant() {
    let env = Env::default();
    let factory = Address::generate(&env);
    let other_factory = Address::generate(&env);
    let beneficiary = Address::generate(&env);

    let address = grant_address(&env, &factory, &beneficiary, START, END, AMOUNT);
    assert_eq!(
        address,
        grant_address(&env, &factory, &beneficiary, START, END, AMOUNT)
    );
    assert_ne!(
        address,
        grant_address(&env, &other_factory, &beneficiary, START, END, AMOUNT)
    );
    assert_ne!(
        address,
        grant_address(&env, &factory, &beneficiary, START, END, AMOUNT + 1)
    );
}
