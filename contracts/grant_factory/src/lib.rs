#![no_std]

//! Deploys grant accounts at addresses derived from the grant itself, funds
//! them from the caller and initializes them in the same invocation.
//!
//! Every account runs the same uploaded wasm. The factory deploys one
//! disabled template from it at construction and each grant is a clone that
//! records the template it was cloned from.

use grant_core::{
    is_null, CloneOf, Error, Grant, GRANT_BUMP_AMOUNT, GRANT_BUMP_THRESHOLD,
    INSTANCE_BUMP_AMOUNT, INSTANCE_BUMP_THRESHOLD,
};
use soroban_sdk::{
    contract, contractclient, contractimpl, contracttype, log, panic_with_error, symbol_short,
    token, Address, BytesN, Env, Symbol,
};

const EVT_GRANT_DEPLOYED: Symbol = symbol_short!("deployed");

/// Salt of the template account. Grant salts are sha256 digests and never
/// take this value.
const TEMPLATE_SALT: [u8; 32] = [0; 32];

/// The part of the grant account interface the factory calls.
#[contractclient(name = "GrantAccountClient")]
pub trait GrantAccountInterface {
    fn initialize(
        env: Env,
        owner: Address,
        beneficiary: Address,
        start_ts: u64,
        end_ts: u64,
        amount: i128,
    ) -> Result<(), Error>;

    fn owner(env: Env) -> Option<Address>;

    fn beneficiary(env: Env) -> Option<Address>;

    fn template(env: Env) -> Option<Address>;

    fn initializer(env: Env) -> Option<Address>;

    fn grant(env: Env) -> Result<Grant, Error>;
}

#[contract]
pub struct GrantFactory;

#[derive(Clone)]
#[contracttype]
enum DataKey {
    Token,
    Pool,
    AccountWasm,
    Template,
    /// Owner of a grant account this factory deployed.
    Grant(Address),
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_BUMP_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(Error::NotInitialized)
}

fn read_account_wasm(env: &Env) -> Result<BytesN<32>, Error> {
    env.storage()
        .instance()
        .get(&DataKey::AccountWasm)
        .ok_or(Error::NotInitialized)
}

fn bump_grant(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, GRANT_BUMP_THRESHOLD, GRANT_BUMP_AMOUNT);
}

fn read_grant_owner(env: &Env, account: Address) -> Option<Address> {
    let key = DataKey::Grant(account);
    let owner = env.storage().persistent().get(&key);
    if owner.is_some() {
        bump_grant(env, &key);
    }
    owner
}

#[contractimpl]
impl GrantFactory {
    /// `account_wasm_hash` must be the hash of the uploaded grant account wasm.
    pub fn __constructor(env: Env, token: Address, pool: Address, account_wasm_hash: BytesN<32>) {
        if is_null(&env, &token) {
            panic_with_error!(&env, Error::TokenAddressZero);
        }
        if is_null(&env, &pool) {
            panic_with_error!(&env, Error::PoolAddressZero);
        }

        let template = env
            .deployer()
            .with_current_contract(BytesN::from_array(&env, &TEMPLATE_SALT))
            .deploy_v2(
                account_wasm_hash.clone(),
                (token.clone(), pool.clone(), None::<CloneOf>),
            );

        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::Pool, &pool);
        env.storage()
            .instance()
            .set(&DataKey::AccountWasm, &account_wasm_hash);
        env.storage().instance().set(&DataKey::Template, &template);
        bump_instance(&env);

        log!(&env, "grant account template deployed", template);
    }

    /// Deploys, funds and initializes the grant account for
    /// `(beneficiary, start_ts, end_ts, amount)`, with `owner` as its owner.
    ///
    /// `owner` must have approved the factory for at least `amount` of the
    /// token. The same four parameters can only ever be used once.
    pub fn deploy_grant(
        env: Env,
        owner: Address,
        beneficiary: Address,
        start_ts: u64,
        end_ts: u64,
        amount: i128,
    ) -> Result<Address, Error> {
        owner.require_auth();

        if amount <= 0 {
            return Err(Error::AmountZero);
        }
        if is_null(&env, &beneficiary) {
            return Err(Error::BeneficiaryZero);
        }
        Grant::new(start_ts, end_ts, amount)?;

        let salt = grant_core::grant_salt(&env, &beneficiary, start_ts, end_ts, amount);
        let deployer = env.deployer().with_current_contract(salt);
        let account = deployer.deployed_address();

        let key = DataKey::Grant(account.clone());
        if env.storage().persistent().has(&key) {
            return Err(Error::DuplicateGrant);
        }

        let token = read_address(&env, &DataKey::Token)?;
        let pool = read_address(&env, &DataKey::Pool)?;
        let template = read_address(&env, &DataKey::Template)?;
        let clone_of = CloneOf {
            template,
            initializer: env.current_contract_address(),
        };
        deployer.deploy_v2(read_account_wasm(&env)?, (token.clone(), pool, Some(clone_of)));

        token::Client::new(&env, &token).transfer_from(
            &env.current_contract_address(),
            &owner,
            &account,
            &amount,
        );
        GrantAccountClient::new(&env, &account).initialize(
            &owner,
            &beneficiary,
            &start_ts,
            &end_ts,
            &amount,
        );

        env.storage().persistent().set(&key, &owner);
        bump_grant(&env, &key);
        bump_instance(&env);

        log!(&env, "grant deployed", account);
        env.events().publish(
            (EVT_GRANT_DEPLOYED, owner, beneficiary),
            (account.clone(), start_ts, end_ts, amount),
        );
        Ok(account)
    }

    /// Address `deploy_grant` uses for these parameters, whether or not the
    /// grant exists yet. Off-chain callers get the same result from
    /// `grant_core::grant_address` with this factory's address.
    pub fn grant_address(
        env: Env,
        beneficiary: Address,
        start_ts: u64,
        end_ts: u64,
        amount: i128,
    ) -> Address {
        grant_core::grant_address(
            &env,
            &env.current_contract_address(),
            &beneficiary,
            start_ts,
            end_ts,
            amount,
        )
    }

    pub fn grant_salt(
        env: Env,
        beneficiary: Address,
        start_ts: u64,
        end_ts: u64,
        amount: i128,
    ) -> BytesN<32> {
        grant_core::grant_salt(&env, &beneficiary, start_ts, end_ts, amount)
    }

    pub fn is_grant(env: Env, account: Address) -> bool {
        read_grant_owner(&env, account).is_some()
    }

    /// Owner recorded by `deploy_grant`. Reading extends the entry's TTL.
    pub fn grant_owner(env: Env, account: Address) -> Option<Address> {
        read_grant_owner(&env, account)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Token)
    }

    pub fn pool(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Pool)
    }

    pub fn template(env: Env) -> Result<Address, Error> {
        read_address(&env, &DataKey::Template)
    }

    pub fn account_wasm_hash(env: Env) -> Result<BytesN<32>, Error> {
        read_account_wasm(&env)
    }
}
