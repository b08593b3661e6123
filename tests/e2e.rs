//! 针对已部署合约的端到端检查，只使用 `eth_call` 模拟，不修改链上状态。
//!
//! 需要环境变量 `RPC_URL`、`PRIV_KEY_PATH`（部署账户）和
//! `STYLUS_CONTRACT_ADDRESS`，运行：`cargo test --features e2e --test e2e`

use ethers::{
    contract::ContractError,
    middleware::SignerMiddleware,
    prelude::abigen,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};
use eyre::{eyre, WrapErr};
use std::{str::FromStr, sync::Arc};

abigen!(
    IAmUkrainian,
    r#"[
        function owner() external view returns (address)
        function totalSupply() external view returns (uint256)
        function contractURI() external view returns (string)
        function tokenURI(uint256 token_id) external view returns (string)
        function balanceOf(address owner) external view returns (uint256)
        function ownerOf(uint256 token_id) external view returns (address)
        function changeBaseURI(string new_uri) external
        function changeBaseContractURI(string new_uri) external
        function safeMint(address to, uint256 count) external
        function safeTransferFrom(address from, address to, uint256 token_id) external
    ]"#
);

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

const STRANGER: &str = "0x00000000000000000000000000000000deadbeef";

async fn connect() -> eyre::Result<(IAmUkrainian<Client>, Address)> {
    dotenv::dotenv().ok();
    let rpc_url = std::env::var("RPC_URL").map_err(|_| eyre!("No RPC_URL env var set"))?;
    let key_path =
        std::env::var("PRIV_KEY_PATH").map_err(|_| eyre!("No PRIV_KEY_PATH env var set"))?;
    let address = std::env::var("STYLUS_CONTRACT_ADDRESS")
        .map_err(|_| eyre!("No STYLUS_CONTRACT_ADDRESS env var set"))?;

    let privkey = std::fs::read_to_string(&key_path)
        .wrap_err_with(|| format!("failed to read private key from {key_path}"))?;
    let wallet = LocalWallet::from_str(privkey.trim())?;
    let provider = Provider::<Http>::try_from(rpc_url.as_str())?;
    let chain_id = provider.get_chainid().await?.as_u64();
    let deployer = wallet.address();
    let client = Arc::new(SignerMiddleware::new(
        provider,
        wallet.with_chain_id(chain_id),
    ));
    Ok((IAmUkrainian::new(Address::from_str(&address)?, client), deployer))
}

fn revert_reason(err: ContractError<Client>) -> Option<String> {
    err.decode_revert::<String>()
}

#[tokio::test]
async fn deployed_state() -> eyre::Result<()> {
    let (nft, deployer) = connect().await?;

    assert_eq!(nft.owner().call().await?, deployer);
    assert!(nft.total_supply().call().await? >= U256::from(10_000));
    assert!(nft.token_uri(U256::zero()).call().await?.ends_with("1.json"));
    assert!(!nft.contract_uri().call().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn admin_calls_are_owner_only() -> eyre::Result<()> {
    let (nft, deployer) = connect().await?;
    let stranger = Address::from_str(STRANGER)?;

    let err = nft
        .change_base_uri("newUri".into())
        .from(stranger)
        .call()
        .await
        .expect_err("stranger cannot change base uri");
    assert_eq!(
        revert_reason(err).as_deref(),
        Some("Ownable: caller is not the owner")
    );

    let err = nft
        .change_base_contract_uri("newContractUri".into())
        .from(stranger)
        .call()
        .await
        .expect_err("stranger cannot change contract uri");
    assert_eq!(
        revert_reason(err).as_deref(),
        Some("Ownable: caller is not the owner")
    );

    let err = nft
        .safe_mint(stranger, U256::from(521))
        .from(stranger)
        .call()
        .await
        .expect_err("stranger cannot mint");
    assert_eq!(
        revert_reason(err).as_deref(),
        Some("Ownable: caller is not the owner")
    );

    nft.safe_mint(stranger, U256::from(521))
        .from(deployer)
        .call()
        .await?;
    Ok(())
}

#[tokio::test]
async fn stranger_cannot_move_tokens() -> eyre::Result<()> {
    let (nft, _) = connect().await?;
    let stranger = Address::from_str(STRANGER)?;
    let holder = nft.owner_of(U256::zero()).call().await?;

    let err = nft
        .safe_transfer_from(holder, stranger, U256::zero())
        .from(stranger)
        .call()
        .await
        .expect_err("stranger cannot transfer");
    assert_eq!(
        revert_reason(err).as_deref(),
        Some("ERC721: caller is not token owner or approved")
    );
    Ok(())
}
