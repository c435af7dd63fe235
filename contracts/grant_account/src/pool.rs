use soroban_sdk::{contractclient, Address, Env};

/// Staking pool a grant account deposits into. Every call names the
/// depositor; the pool authenticates it, and since the grant account invokes
/// the pool directly its own address is authorized implicitly.
#[contractclient(name = "StakingPoolClient")]
pub trait StakingPool {
    /// Pulls `amount` from `depositor` using an allowance granted to the pool.
    fn deposit(env: Env, depositor: Address, amount: i128);

    fn withdraw(env: Env, depositor: Address, amount: i128);

    /// Same effect as `withdraw`, using the pool's cached locked balance.
    fn withdraw_precalculated(env: Env, depositor: Address, amount: i128);

    fn stake(env: Env, depositor: Address, amount: i128);

    fn schedule_unstake(env: Env, depositor: Address, amount: i128);

    /// Completes a matured scheduled unstake and returns the unstaked amount.
    fn unstake(env: Env, depositor: Address) -> i128;

    fn delegate(env: Env, depositor: Address, delegatee: Address);

    fn undelegate(env: Env, depositor: Address);

    // Observer reads. The grant account never relies on these itself.

    fn user_balance(env: Env, user: Address) -> i128;

    fn user_stake(env: Env, user: Address) -> i128;

    fn user_locked(env: Env, user: Address) -> i128;

    fn user_delegate(env: Env, user: Address) -> Option<Address>;
}
