// 如果未启用 export-abi 特性，仅作为 WASM 运行
#![cfg_attr(not(any(feature = "export-abi", test)), no_main)]
extern crate alloc;

// 引入模块和依赖
pub mod erc721;
pub mod ownable;
pub mod revert;

#[cfg(test)]
mod test_utils;

use crate::erc721::{Erc721, Erc721Error, Erc721Params};
use crate::ownable::{Ownable, OwnableError};
use crate::revert::RevertReason;
use alloc::{format, string::String, vec::Vec};
use alloy_primitives::{Address, U256};
// 引入 Stylus SDK 和 alloy 基本类型
use stylus_sdk::prelude::*;

// 部署时铸造给初始拥有者的数量
pub const INITIAL_SUPPLY: u64 = 10_000;
// 初始的元数据 base URI
pub const INITIAL_BASE_URI: &str = "ipfs://QmVht4TEniKhc2XPDhZw4SVv9K8WdyCzdRHGF761mjUFdg/";
// 初始的合约级元数据 URI
pub const INITIAL_CONTRACT_URI: &str = "ipfs://QmeRMfUzVGjjsPTpBYRdnZfjSQ6u3N6vdDi2LSpVdELJsA";

// 定义 NFT 参数结构体
pub struct IAmUkrainianParams;
// 实现 Erc721Params trait
impl Erc721Params for IAmUkrainianParams {
    const NAME: &'static str = "I_AM_UKRAINIAN";
    const SYMBOL: &'static str = "IAMUA";
    // 元数据文件从 1 开始编号
    fn token_uri(base_uri: &str, token_id: U256) -> String {
        format!("{}{}{}", base_uri, token_id + U256::from(1), ".json")
    }
}

// 合约错误，合并 ERC-721 与 Ownable 的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    Erc721(Erc721Error),
    Ownable(OwnableError),
}

impl From<Erc721Error> for ContractError {
    fn from(err: Erc721Error) -> Self {
        ContractError::Erc721(err)
    }
}

impl From<OwnableError> for ContractError {
    fn from(err: OwnableError) -> Self {
        ContractError::Ownable(err)
    }
}

impl RevertReason for ContractError {
    fn reason(&self) -> &'static str {
        match self {
            ContractError::Erc721(err) => err.reason(),
            ContractError::Ownable(err) => err.reason(),
        }
    }
}

impl From<ContractError> for Vec<u8> {
    fn from(err: ContractError) -> Vec<u8> {
        err.encode()
    }
}

// 定义合约入口点和存储结构
sol_storage! {
    #[entrypoint]
    pub struct IAmUkrainian {
        // 允许 erc721 访问 IAmUkrainian 的存储并调用方法
        #[borrow]
        Erc721<IAmUkrainianParams> erc721;
        // 管理员权限
        #[borrow]
        Ownable ownable;
        // 合约级元数据 URI
        string contract_uri;
    }
}

// 实现 IAmUkrainian 的外部方法
#[public]
#[inherit(Erc721<IAmUkrainianParams>, Ownable)]
impl IAmUkrainian {
    // 部署：设置拥有者和 URI，并把初始供应量铸造给拥有者
    #[constructor]
    pub fn constructor(&mut self, initial_owner: Address) -> Result<(), ContractError> {
        self.ownable.initialize(initial_owner)?;
        self.erc721.set_base_uri(INITIAL_BASE_URI);
        self.contract_uri.set_str(INITIAL_CONTRACT_URI);
        Erc721::<IAmUkrainianParams>::safe_mint(self, initial_owner, U256::from(INITIAL_SUPPLY))?;
        Ok(())
    }

    // 获取总供应量
    pub fn total_supply(&self) -> Result<U256, ContractError> {
        Ok(self.erc721.total_supply())
    }

    // 获取合约级元数据 URI
    #[selector(name = "contractURI")]
    pub fn contract_uri(&self) -> Result<String, ContractError> {
        Ok(self.contract_uri.get_string())
    }

    // 修改 base URI，仅限拥有者
    #[selector(name = "changeBaseURI")]
    pub fn change_base_uri(&mut self, new_uri: String) -> Result<(), ContractError> {
        self.ownable.only_owner()?;
        self.erc721.set_base_uri(&new_uri);
        Ok(())
    }

    // 修改合约级 URI，仅限拥有者
    #[selector(name = "changeBaseContractURI")]
    pub fn change_base_contract_uri(&mut self, new_uri: String) -> Result<(), ContractError> {
        self.ownable.only_owner()?;
        self.contract_uri.set_str(&new_uri);
        Ok(())
    }

    // 连续铸造 count 个 NFT 给指定地址，仅限拥有者
    pub fn safe_mint(&mut self, to: Address, count: U256) -> Result<(), ContractError> {
        self.ownable.only_owner()?;
        Erc721::<IAmUkrainianParams>::safe_mint(self, to, count)?;
        Ok(())
    }
}
