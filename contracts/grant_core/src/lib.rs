#![no_std]

//! Types shared by the grant account and grant factory contracts: the vesting
//! schedule and its release formula, the error codes both contracts return,
//! the reserved identities used as "no address" markers and the salt that
//! fingerprints a grant.

use soroban_sdk::{contracterror, contracttype, xdr::ToXdr, Address, BytesN, Env, String};

/// Strkey of the all-zero ed25519 account. Nobody holds its secret key, so it
/// stands in for "no address" wherever a role or collaborator must be set.
pub const NULL_ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

/// Beneficiary written by a template account at construction. This is the
/// contract id `0xff..ff`, which no deployer can ever produce, so it can never
/// authorize anything and keeps `initialize` permanently closed.
pub const DISABLED_BENEFICIARY: &str = "CD7777777777777777777777777777777777777777777777777767GY";

pub const DAY_IN_LEDGERS: u32 = 17_280;

/// TTL policy for contract instances (account and factory state).
pub const INSTANCE_BUMP_AMOUNT: u32 = 90 * DAY_IN_LEDGERS;
pub const INSTANCE_BUMP_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// TTL policy for the factory's per-grant registry entries.
pub const GRANT_BUMP_AMOUNT: u32 = 180 * DAY_IN_LEDGERS;
pub const GRANT_BUMP_THRESHOLD: u32 = GRANT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    TokenAddressZero = 1,
    PoolAddressZero = 2,
    OwnerZero = 3,
    BeneficiaryZero = 4,
    /// Amount is zero or negative.
    AmountZero = 5,
    StartZero = 6,
    EndNotAfterStart = 7,
    AlreadyInitialized = 8,
    /// The account was not funded with exactly the vesting amount before initialization.
    BalanceNotVestingAmount = 9,
    NotInitialized = 10,
    NotOwner = 11,
    NotBeneficiary = 12,
    NothingToWithdraw = 13,
    BalanceZero = 14,
    NotYetVested = 15,
    DuplicateGrant = 16,
    MathOverflow = 17,
}

/// A linear vesting schedule. Immutable once written by `initialize`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Grant {
    pub start_ts: u64,
    pub end_ts: u64,
    pub amount: i128,
}

impl Grant {
    pub fn new(start_ts: u64, end_ts: u64, amount: i128) -> Result<Self, Error> {
        if amount <= 0 {
            return Err(Error::AmountZero);
        }
        if start_ts == 0 {
            return Err(Error::StartZero);
        }
        if end_ts <= start_ts {
            return Err(Error::EndNotAfterStart);
        }
        Ok(Self {
            start_ts,
            end_ts,
            amount,
        })
    }

    /// Amount released by `now`. Zero up to and including `start_ts`, the
    /// full amount from `end_ts` on, floor-divided linear in between.
    pub fn vested_at(&self, now: u64) -> Result<i128, Error> {
        if now < self.start_ts {
            return Ok(0);
        }
        if now >= self.end_ts {
            return Ok(self.amount);
        }

        let elapsed = i128::from(now - self.start_ts);
        let duration = i128::from(self.end_ts - self.start_ts);
        self.amount
            .checked_mul(elapsed)
            .ok_or(Error::MathOverflow)?
            .checked_div(duration)
            .ok_or(Error::MathOverflow)
    }

    pub fn unvested_at(&self, now: u64) -> Result<i128, Error> {
        let vested = self.vested_at(now)?;
        self.amount.checked_sub(vested).ok_or(Error::MathOverflow)
    }
}

/// Constructor argument that makes a grant account an initializable clone.
/// Only `initializer` can authorize the clone's `initialize`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CloneOf {
    pub template: Address,
    pub initializer: Address,
}

pub fn null_address(env: &Env) -> Address {
    Address::from_string(&String::from_str(env, NULL_ADDRESS))
}

pub fn disabled_beneficiary(env: &Env) -> Address {
    Address::from_string(&String::from_str(env, DISABLED_BENEFICIARY))
}

pub fn is_null(env: &Env, address: &Address) -> bool {
    *address == null_address(env)
}

/// Content fingerprint of a grant, used as the deployment salt of its account.
///
/// `sha256(xdr(beneficiary) || start_ts || end_ts || amount)` with the integers
/// big-endian. Any change to the four parameters changes the account address.
pub fn grant_salt(
    env: &Env,
    beneficiary: &Address,
    start_ts: u64,
    end_ts: u64,
    amount: i128,
) -> BytesN<32> {
    let mut preimage = beneficiary.clone().to_xdr(env);
    preimage.extend_from_array(&start_ts.to_be_bytes());
    preimage.extend_from_array(&end_ts.to_be_bytes());
    preimage.extend_from_array(&amount.to_be_bytes());
    env.crypto().sha256(&preimage).to_bytes()
}

/// Address at which `factory` deploys the account for this grant. Pure: it
/// holds whether or not the account exists yet.
pub fn grant_address(
    env: &Env,
    factory: &Address,
    beneficiary: &Address,
    start_ts: u64,
    end_ts: u64,
    amount: i128,
) -> Address {
    let salt = grant_salt(env, beneficiary, start_ts, end_ts, amount);
    env.deployer()
        .with_address(factory.clone(), salt)
        .deployed_address()
}

mod test;
