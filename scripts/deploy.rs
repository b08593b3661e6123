//! 部署 I_AM_UKRAINIAN 合约并打印地址。
//!
//! 需要先安装 `cargo stylus`，并在 `.env` 或环境变量中提供：
//!
//! - `RPC_URL`：Arbitrum 节点的 RPC 地址
//! - `PRIV_KEY_PATH`：保存部署账户私钥（十六进制）的文件路径
//!
//! 运行：`cargo run --example deploy`

use ethers::{
    middleware::SignerMiddleware,
    prelude::abigen,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::Address,
};
use eyre::{eyre, WrapErr};
use regex::Regex;
use std::{process::Command, str::FromStr, sync::Arc};

/// 部署账户私钥文件路径的环境变量
const PRIV_KEY_PATH: &str = "PRIV_KEY_PATH";

/// RPC 地址的环境变量
const RPC_URL: &str = "RPC_URL";

abigen!(
    IAmUkrainian,
    r#"[
        function owner() external view returns (address)
        function totalSupply() external view returns (uint256)
    ]"#
);

/// 部署所需的配置
struct Config {
    rpc_url: String,
    priv_key_path: String,
}

impl Config {
    fn from_env() -> eyre::Result<Self> {
        dotenv::dotenv().ok();
        let priv_key_path =
            std::env::var(PRIV_KEY_PATH).map_err(|_| eyre!("No {} env var set", PRIV_KEY_PATH))?;
        let rpc_url = std::env::var(RPC_URL).map_err(|_| eyre!("No {} env var set", RPC_URL))?;
        Ok(Self {
            rpc_url,
            priv_key_path,
        })
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::from_env()?;

    let privkey = read_secret_from_file(&config.priv_key_path)?;
    let wallet = LocalWallet::from_str(&privkey).wrap_err("invalid private key")?;
    let deployer = wallet.address();

    let address = deploy(&config, deployer)?;

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?;
    let chain_id = provider.get_chainid().await?.as_u64();
    let client = Arc::new(SignerMiddleware::new(
        provider,
        wallet.with_chain_id(chain_id),
    ));
    let nft = IAmUkrainian::new(address, client);

    let owner = nft.owner().call().await?;
    if owner != deployer {
        return Err(eyre!("unexpected owner {owner:?}, expected {deployer:?}"));
    }
    let supply = nft.total_supply().call().await?;
    eprintln!("total supply = {supply}");

    println!("deployed to {address:?}");
    Ok(())
}

/// 通过 `cargo stylus deploy` 部署并激活合约，构造参数为部署账户地址
fn deploy(config: &Config, deployer: Address) -> eyre::Result<Address> {
    let output = Command::new("cargo")
        .args(["stylus", "deploy"])
        .args(["--endpoint", &config.rpc_url])
        .args(["--private-key-path", &config.priv_key_path])
        .args(["--no-verify"])
        .args(["--constructor-args", &format!("{deployer:?}")])
        .output()
        .wrap_err("failed to execute `cargo stylus deploy` command")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!("`cargo stylus deploy` failed:\n{stdout}{stderr}"));
    }

    parse_deployed_address(&stdout)
}

/// 从 `cargo stylus deploy` 的输出中提取合约地址
fn parse_deployed_address(output: &str) -> eyre::Result<Address> {
    // 输出带有颜色控制符
    let ansi = Regex::new(r"\x1b\[[0-9;]*m").wrap_err("failed to create ansi regex")?;
    let plain = ansi.replace_all(output, "");
    let address_regex = Regex::new(r"(?i)deployed code at address:\s*(0x[0-9a-f]{40})")
        .wrap_err("failed to create address regex")?;
    let captures = address_regex
        .captures(&plain)
        .ok_or_else(|| eyre!("deployed address not found in output:\n{plain}"))?;
    Address::from_str(&captures[1]).wrap_err("invalid deployed address")
}

fn read_secret_from_file(fpath: &str) -> eyre::Result<String> {
    let contents = std::fs::read_to_string(fpath)
        .wrap_err_with(|| format!("failed to read private key from {fpath}"))?;
    Ok(contents.trim().to_string())
}
