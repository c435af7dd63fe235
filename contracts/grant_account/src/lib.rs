#![no_std]

//! One beneficiary's vesting position. The account custodies the granted
//! tokens, releases them to the beneficiary on a linear schedule, lets the
//! owner claw back whatever it still holds, and forwards the beneficiary's
//! staking instructions to the pool with itself as the depositor.

mod pool;

pub use grant_core::{CloneOf, Error, Grant};
pub use pool::{StakingPool, StakingPoolClient};

use grant_core::{disabled_beneficiary, is_null, INSTANCE_BUMP_AMOUNT, INSTANCE_BUMP_THRESHOLD};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, panic_with_error, symbol_short, token, Address,
    Env, Symbol,
};

const EVT_BENEFICIARY_CHANGED: Symbol = symbol_short!("benef_chg");
const EVT_OWNER_WITHDREW: Symbol = symbol_short!("own_wdrw");
const EVT_BENEFICIARY_WITHDREW: Symbol = symbol_short!("ben_wdrw");

#[contract]
pub struct GrantAccount;

#[derive(Clone)]
#[contracttype]
enum DataKey {
    Token,
    Pool,
    /// Template this account was cloned from. Absent on the template itself.
    Template,
    /// Only party allowed to initialize a clone.
    Initializer,
    Owner,
    /// Absent until `initialize`, `DISABLED_BENEFICIARY` on a template.
    Beneficiary,
    Grant,
    /// Cumulative amount withdrawn by beneficiaries.
    Released,
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_BUMP_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn read_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

fn read_pool(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Pool)
        .ok_or(Error::NotInitialized)
}

fn read_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Owner)
}

fn read_beneficiary(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Beneficiary)
}

fn read_grant(env: &Env) -> Result<Grant, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Grant)
        .ok_or(Error::NotInitialized)
}

fn read_released(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::Released)
        .unwrap_or(0)
}

fn token_client(env: &Env) -> Result<token::Client<'_>, Error> {
    Ok(token::Client::new(env, &read_token(env)?))
}

fn pool_client(env: &Env) -> Result<StakingPoolClient<'_>, Error> {
    Ok(StakingPoolClient::new(env, &read_pool(env)?))
}

// Roles are compared before authorization is required, so a wrong caller
// always gets the role error.

fn require_owner(env: &Env, caller: &Address) -> Result<Address, Error> {
    match read_owner(env) {
        Some(owner) if owner == *caller => {
            caller.require_auth();
            Ok(owner)
        }
        _ => Err(Error::NotOwner),
    }
}

fn require_beneficiary(env: &Env, caller: &Address) -> Result<Address, Error> {
    match read_beneficiary(env) {
        Some(beneficiary) if beneficiary == *caller => {
            caller.require_auth();
            Ok(beneficiary)
        }
        _ => Err(Error::NotBeneficiary),
    }
}

#[contractimpl]
impl GrantAccount {
    /// Builds a template when `clone_of` is `None`, otherwise an uninitialized
    /// clone that only `clone_of.initializer` can initialize. A template can
    /// never be initialized.
    pub fn __constructor(env: Env, token: Address, pool: Address, clone_of: Option<CloneOf>) {
        if is_null(&env, &token) {
            panic_with_error!(&env, Error::TokenAddressZero);
        }
        if is_null(&env, &pool) {
            panic_with_error!(&env, Error::PoolAddressZero);
        }

        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::Pool, &pool);
        match clone_of {
            Some(clone_of) => {
                env.storage()
                    .instance()
                    .set(&DataKey::Template, &clone_of.template);
                env.storage()
                    .instance()
                    .set(&DataKey::Initializer, &clone_of.initializer);
            }
            None => {
                env.storage()
                    .instance()
                    .set(&DataKey::Beneficiary, &disabled_beneficiary(&env));
                log!(&env, "grant account template disabled");
            }
        }
        bump_instance(&env);
    }

    /// Sets roles and schedule exactly once, authorized by the initializer
    /// recorded at construction. The account must already hold exactly
    /// `amount` tokens.
    pub fn initialize(
        env: Env,
        owner: Address,
        beneficiary: Address,
        start_ts: u64,
        end_ts: u64,
        amount: i128,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Beneficiary) {
            return Err(Error::AlreadyInitialized);
        }
        let initializer: Address = env
            .storage()
            .instance()
            .get(&DataKey::Initializer)
            .ok_or(Error::AlreadyInitialized)?;
        initializer.require_auth();

        if is_null(&env, &owner) {
            return Err(Error::OwnerZero);
        }
        if is_null(&env, &beneficiary) {
            return Err(Error::BeneficiaryZero);
        }

        let grant = Grant::new(start_ts, end_ts, amount)?;

        let balance = token_client(&env)?.balance(&env.current_contract_address());
        if balance != amount {
            return Err(Error::BalanceNotVestingAmount);
        }

        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Beneficiary, &beneficiary);
        env.storage().instance().set(&DataKey::Grant, &grant);
        env.storage().instance().set(&DataKey::Released, &0_i128);
        bump_instance(&env);

        log!(&env, "grant initialized", owner, beneficiary, amount);
        Ok(())
    }

    pub fn set_beneficiary(env: Env, caller: Address, beneficiary: Address) -> Result<(), Error> {
        require_owner(&env, &caller)?;

        if is_null(&env, &beneficiary) {
            return Err(Error::BeneficiaryZero);
        }

        env.storage().instance().set(&DataKey::Beneficiary, &beneficiary);
        bump_instance(&env);

        env.events()
            .publish((EVT_BENEFICIARY_CHANGED,), beneficiary);
        Ok(())
    }

    /// Sends the whole balance held by the account to the owner, vested or
    /// not. Tokens deposited at the pool are not touched.
    pub fn withdraw_as_owner(env: Env, caller: Address) -> Result<i128, Error> {
        let owner = require_owner(&env, &caller)?;

        let contract = env.current_contract_address();
        let token = token_client(&env)?;
        let balance = token.balance(&contract);
        if balance <= 0 {
            return Err(Error::NothingToWithdraw);
        }

        token.transfer(&contract, &owner, &balance);
        bump_instance(&env);

        env.events().publish((EVT_OWNER_WITHDREW, owner), balance);
        Ok(balance)
    }

    /// Sends the beneficiary what has vested and not been withdrawn yet,
    /// capped by what the account currently holds.
    pub fn withdraw_as_beneficiary(env: Env, caller: Address) -> Result<i128, Error> {
        let beneficiary = require_beneficiary(&env, &caller)?;

        let contract = env.current_contract_address();
        let token = token_client(&env)?;
        let balance = token.balance(&contract);
        if balance <= 0 {
            return Err(Error::BalanceZero);
        }

        let grant = read_grant(&env)?;
        let released = read_released(&env);
        let releasable = grant
            .vested_at(env.ledger().timestamp())?
            .checked_sub(released)
            .ok_or(Error::MathOverflow)?;
        if releasable <= 0 {
            return Err(Error::NotYetVested);
        }

        let amount = if releasable > balance {
            balance
        } else {
            releasable
        };

        let released = released.checked_add(amount).ok_or(Error::MathOverflow)?;
        env.storage().instance().set(&DataKey::Released, &released);

        token.transfer(&contract, &beneficiary, &amount);
        bump_instance(&env);

        env.events()
            .publish((EVT_BENEFICIARY_WITHDREW, beneficiary), amount);
        Ok(amount)
    }

    pub fn deposit_at_pool(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;

        let contract = env.current_contract_address();
        let pool = pool_client(&env)?;
        // The allowance only needs to outlive this invocation.
        token_client(&env)?.approve(&contract, &pool.address, &amount, &env.ledger().sequence());
        pool.deposit(&contract, &amount);
        bump_instance(&env);
        Ok(())
    }

    pub fn withdraw_at_pool(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.withdraw(&env.current_contract_address(), &amount);
        bump_instance(&env);
        Ok(())
    }

    pub fn withdraw_precalculated_at_pool(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.withdraw_precalculated(&env.current_contract_address(), &amount);
        bump_instance(&env);
        Ok(())
    }

    pub fn stake_at_pool(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.stake(&env.current_contract_address(), &amount);
        bump_instance(&env);
        Ok(())
    }

    pub fn schedule_unstake_at_pool(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.schedule_unstake(&env.current_contract_address(), &amount);
        bump_instance(&env);
        Ok(())
    }

    /// Open to anyone: it only completes an unstake the beneficiary already
    /// scheduled, and the tokens stay with the account at the pool.
    pub fn unstake_at_pool(env: Env) -> Result<i128, Error> {
        let unstaked = pool_client(&env)?.unstake(&env.current_contract_address());
        bump_instance(&env);
        Ok(unstaked)
    }

    pub fn delegate_at_pool(env: Env, caller: Address, delegatee: Address) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.delegate(&env.current_contract_address(), &delegatee);
        bump_instance(&env);
        Ok(())
    }

    pub fn undelegate_at_pool(env: Env, caller: Address) -> Result<(), Error> {
        require_beneficiary(&env, &caller)?;
        pool_client(&env)?.undelegate(&env.current_contract_address());
        bump_instance(&env);
        Ok(())
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        read_token(&env)
    }

    pub fn pool(env: Env) -> Result<Address, Error> {
        read_pool(&env)
    }

    pub fn template(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Template)
    }

    pub fn initializer(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Initializer)
    }

    pub fn owner(env: Env) -> Option<Address> {
        read_owner(&env)
    }

    pub fn beneficiary(env: Env) -> Option<Address> {
        read_beneficiary(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&DataKey::Grant)
    }

    pub fn grant(env: Env) -> Result<Grant, Error> {
        read_grant(&env)
    }

    pub fn vested_amount(env: Env) -> Result<i128, Error> {
        read_grant(&env)?.vested_at(env.ledger().timestamp())
    }

    pub fn unvested_amount(env: Env) -> Result<i128, Error> {
        read_grant(&env)?.unvested_at(env.ledger().timestamp())
    }

    pub fn released_amount(env: Env) -> i128 {
        read_released(&env)
    }
}

mod testutils;
