#![cfg(test)]

//! Minimal staking pool used by the account tests. It implements the
//! `StakingPool` interface with a fixed unstake waiting period.

use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, token, Address, Env};

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Position {
    pub unstaked: i128,
    pub staked: i128,
    pub unstake_amount: i128,
    pub unstake_at: u64,
    pub locked: i128,
    pub delegate: Option<Address>,
}

#[derive(Clone)]
#[contracttype]
enum PoolKey {
    Token,
    UnstakeWait,
    Position(Address),
}

fn read_position(env: &Env, user: &Address) -> Position {
    env.storage()
        .persistent()
        .get(&PoolKey::Position(user.clone()))
        .unwrap_or(Position {
            unstaked: 0,
            staked: 0,
            unstake_amount: 0,
            unstake_at: 0,
            locked: 0,
            delegate: None,
        })
}

fn write_position(env: &Env, user: &Address, position: &Position) {
    env.storage()
        .persistent()
        .set(&PoolKey::Position(user.clone()), position);
}

fn pool_token(env: &Env) -> token::Client<'_> {
    let token: Address = env.storage().instance().get(&PoolKey::Token).unwrap();
    token::Client::new(env, &token)
}

#[contract]
pub struct MockStakingPool;

#[contractimpl]
impl MockStakingPool {
    pub fn __constructor(env: Env, token: Address, unstake_wait: u64) {
        env.storage().instance().set(&PoolKey::Token, &token);
        env.storage().instance().set(&PoolKey::UnstakeWait, &unstake_wait);
    }

    pub fn deposit(env: Env, depositor: Address, amount: i128) {
        depositor.require_auth();
        let pool = env.current_contract_address();
        pool_token(&env).transfer_from(&pool, &depositor, &pool, &amount);

        let mut position = read_position(&env, &depositor);
        position.unstaked += amount;
        write_position(&env, &depositor, &position);
        env.events()
            .publish((symbol_short!("deposit"), depositor), amount);
    }

    pub fn withdraw(env: Env, depositor: Address, amount: i128) {
        depositor.require_auth();
        let mut position = read_position(&env, &depositor);
        if amount > position.unstaked - position.locked {
            panic!("insufficient unlocked funds");
        }
        position.unstaked -= amount;
        write_position(&env, &depositor, &position);

        pool_token(&env).transfer(&env.current_contract_address(), &depositor, &amount);
        env.events()
            .publish((symbol_short!("withdraw"), depositor), amount);
    }

    pub fn withdraw_precalculated(env: Env, depositor: Address, amount: i128) {
        Self::withdraw(env, depositor, amount);
    }

    pub fn stake(env: Env, depositor: Address, amount: i128) {
        depositor.require_auth();
        let mut position = read_position(&env, &depositor);
        if amount > position.unstaked {
            panic!("insufficient unstaked funds");
        }
        position.unstaked -= amount;
        position.staked += amount;
        write_position(&env, &depositor, &position);
    }

    pub fn schedule_unstake(env: Env, depositor: Address, amount: i128) {
        depositor.require_auth();
        let mut position = read_position(&env, &depositor);
        if position.unstake_amount != 0 {
            panic!("unstake already scheduled");
        }
        if amount > position.staked {
            panic!("insufficient stake");
        }
        let wait: u64 = env.storage().instance().get(&PoolKey::UnstakeWait).unwrap();
        position.staked -= amount;
        position.unstake_amount = amount;
        position.unstake_at = env.ledger().timestamp() + wait;
        write_position(&env, &depositor, &position);
    }

    pub fn unstake(env: Env, depositor: Address) -> i128 {
        let mut position = read_position(&env, &depositor);
        if position.unstake_amount == 0 {
            panic!("no unstake scheduled");
        }
        if env.ledger().timestamp() < position.unstake_at {
            panic!("unstake not mature");
        }
        let amount = position.unstake_amount;
        position.unstaked += amount;
        position.unstake_amount = 0;
        position.unstake_at = 0;
        write_position(&env, &depositor, &position);
        amount
    }

    pub fn delegate(env: Env, depositor: Address, delegatee: Address) {
        depositor.require_auth();
        let mut position = read_position(&env, &depositor);
        position.delegate = Some(delegatee);
        write_position(&env, &depositor, &position);
    }

    pub fn undelegate(env: Env, depositor: Address) {
        depositor.require_auth();
        let mut position = read_position(&env, &depositor);
        position.delegate = None;
        write_position(&env, &depositor, &position);
    }

    pub fn user_balance(env: Env, user: Address) -> i128 {
        let position = read_position(&env, &user);
        position.unstaked + position.staked + position.unstake_amount
    }

    pub fn user_stake(env: Env, user: Address) -> i128 {
        read_position(&env, &user).staked
    }

    pub fn user_locked(env: Env, user: Address) -> i128 {
        read_position(&env, &user).locked
    }

    pub fn user_delegate(env: Env, user: Address) -> Option<Address> {
        read_position(&env, &user).delegate
    }

    pub fn set_locked(env: Env, user: Address, locked: i128) {
        let mut position = read_position(&env, &user);
        position.locked = locked;
        write_position(&env, &user, &position);
    }
}
