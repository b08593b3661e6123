use alloc::{string::String, vec, vec::Vec};
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_sol_types::{sol, SolCall};
use core::{borrow::BorrowMut, marker::PhantomData};
use stylus_sdk::{
    abi::Bytes,
    prelude::*,
    stylus_core::{calls::context::Call, log},
};

use crate::revert::RevertReason;

// 定义 ERC-721 所需的参数 trait
pub trait Erc721Params {
    // NFT 的名称，常量
    const NAME: &'static str;
    // NFT 的符号，常量
    const SYMBOL: &'static str;
    // 由 base URI 生成指定 token_id 的 URI
    fn token_uri(base_uri: &str, token_id: U256) -> String;
}

// 定义 ERC-721 合约的存储结构
sol_storage! {
    pub struct Erc721<T: Erc721Params> {
        // token_id 到拥有者地址的映射，批量铸造时只记录批次的第一个 token
        mapping(uint256 => address) owners;
        // 地址到余额的映射
        mapping(address => uint256) balances;
        // token_id 到授权用户地址的映射
        mapping(uint256 => address) token_approvals;
        // 拥有者地址到操作者地址的授权映射
        mapping(address => mapping(address => bool)) operator_approvals;
        // 总供应量，同时也是下一个 token_id
        uint256 total_supply;
        // 元数据的 base URI
        string base_uri;
        // 用于支持 Erc721Params 的 PhantomData
        PhantomData<T> phantom;
    }
}

// 定义事件
sol! {
    // 转账事件
    event Transfer(address indexed from, address indexed to, uint256 indexed token_id);
    // 授权事件
    event Approval(address indexed owner, address indexed approved, uint256 indexed token_id);
    // 批量授权事件
    event ApprovalForAll(address indexed owner, address indexed operator, bool approved);
}

// 定义 ERC-721 错误枚举，回滚原因与 OpenZeppelin 的字符串一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erc721Error {
    // token_id 未被铸造
    InvalidTokenId,
    // 查询零地址的余额
    ZeroAddressOwner,
    // 指定地址不是 token_id 的拥有者
    IncorrectOwner,
    // 调用者无权转移 token
    NotApproved,
    // 调用者无权设置授权
    ApproveCallerNotAuthorized,
    // 授权给当前拥有者
    ApprovalToCurrentOwner,
    // 把自己设为操作者
    ApproveToCaller,
    // 尝试向零地址转账
    TransferToZero,
    // 铸造给零地址
    MintToZero,
    // 铸造数量为零
    MintZeroQuantity,
    // 单次铸造数量超过上限
    ExceededMaxBatchMint,
    // 总供应量或余额溢出
    SupplyOverflow,
    // 接收者拒绝接收 token
    NonReceiver,
}

impl RevertReason for Erc721Error {
    fn reason(&self) -> &'static str {
        match self {
            Erc721Error::InvalidTokenId => "ERC721: invalid token ID",
            Erc721Error::ZeroAddressOwner => "ERC721: address zero is not a valid owner",
            Erc721Error::IncorrectOwner => "ERC721: transfer from incorrect owner",
            Erc721Error::NotApproved => "ERC721: caller is not token owner or approved",
            Erc721Error::ApproveCallerNotAuthorized => {
                "ERC721: approve caller is not token owner or approved for all"
            }
            Erc721Error::ApprovalToCurrentOwner => "ERC721: approval to current owner",
            Erc721Error::ApproveToCaller => "ERC721: approve to caller",
            Erc721Error::TransferToZero => "ERC721: transfer to the zero address",
            Erc721Error::MintToZero => "ERC721: mint to the zero address",
            Erc721Error::MintZeroQuantity => "ERC721: mint zero quantity",
            Erc721Error::ExceededMaxBatchMint => "ERC721: exceeded max batch mint",
            Erc721Error::SupplyOverflow => "ERC721: token supply overflow",
            Erc721Error::NonReceiver => "ERC721: transfer to non ERC721Receiver implementer",
        }
    }
}

impl From<Erc721Error> for Vec<u8> {
    fn from(err: Erc721Error) -> Vec<u8> {
        err.encode()
    }
}

// 定义 IERC721TokenReceiver 接口，调用经由 vm 发出
sol! {
    interface IERC721TokenReceiver {
        function onERC721Received(address operator, address from, uint256 token_id, bytes data) external returns(bytes4);
    }
}

// 定义 onERC721Received 方法的选择器常量
pub const ERC721_TOKEN_RECEIVER_ID: u32 = 0x150b7a02;

// 单次铸造的数量上限
pub const MAX_BATCH_SIZE: u64 = 10_000;

// 批次内每隔多少个 token 写入一次拥有者记录，owner_of 最多向前读取这么多个槽位
pub const OWNERSHIP_CHECKPOINT_INTERVAL: u64 = 128;

// 实现 ERC-721 内部方法
impl<T: Erc721Params> Erc721<T> {
    // 已铸造的数量
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get()
    }

    // 当前 base URI
    pub fn base_uri(&self) -> String {
        self.base_uri.get_string()
    }

    // 更新 base URI，权限由上层合约检查
    pub fn set_base_uri(&mut self, base_uri: &str) {
        self.base_uri.set_str(base_uri);
    }

    // 检查 msg_sender 是否有权操作指定 token
    fn require_authorized_to_spend(&self, token_id: U256) -> Result<Address, Erc721Error> {
        // 获取 token_id 的拥有者，同时确认 token 存在
        let owner = self.owner_of(token_id)?;
        let spender = self.vm().msg_sender();
        // 拥有者、拥有者的操作者或被授权者均可转移
        if spender == owner
            || self.operator_approvals.getter(owner).get(spender)
            || spender == self.token_approvals.get(token_id)
        {
            return Ok(owner);
        }
        Err(Erc721Error::NotApproved)
    }

    // 执行 token 转账操作
    pub fn transfer(
        &mut self,
        token_id: U256,
        from: Address,
        to: Address,
    ) -> Result<(), Erc721Error> {
        // 验证 from 是否为拥有者
        if self.owner_of(token_id)? != from {
            return Err(Erc721Error::IncorrectOwner);
        }
        if to.is_zero() {
            return Err(Erc721Error::TransferToZero);
        }
        // 更新 token 的拥有者
        self.owners.insert(token_id, to);
        // 下一个 token 若还依赖本 token 的记录，则显式写入原拥有者
        let next = token_id + U256::from(1);
        if next < self.total_supply.get() && self.owners.get(next).is_zero() {
            self.owners.insert(next, from);
        }
        // 减少 from 的余额
        let mut from_balance = self.balances.setter(from);
        let balance = from_balance.get() - U256::from(1);
        from_balance.set(balance);
        // 增加 to 的余额
        let mut to_balance = self.balances.setter(to);
        let balance = to_balance.get() + U256::from(1);
        to_balance.set(balance);
        // 清除 token 的授权记录
        self.token_approvals.delete(token_id);
        // 记录转账事件
        log(self.vm(), Transfer { from, to, token_id });
        Ok(())
    }

    // 如果接收者是合约，调用 onERC721Received 方法
    fn call_receiver<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        token_id: U256,
        from: Address,
        to: Address,
        data: Vec<u8>,
    ) -> Result<(), Erc721Error> {
        let this: &mut Self = storage.borrow_mut();
        // 接收者不是合约，无需检查
        if this.vm().code_size(to) == 0 {
            return Ok(());
        }
        let calldata = IERC721TokenReceiver::onERC721ReceivedCall {
            operator: this.vm().msg_sender(),
            from,
            token_id,
            data: data.into(),
        }
        .abi_encode();
        let returned = this
            .vm()
            .call(&Call::new(), to, &calldata)
            .map_err(|_e| Erc721Error::NonReceiver)?;
        let received =
            IERC721TokenReceiver::onERC721ReceivedCall::abi_decode_returns(&returned, true)
                .map_err(|_e| Erc721Error::NonReceiver)?
                ._0;
        // 验证返回的选择器是否正确
        if u32::from_be_bytes(received.0) != ERC721_TOKEN_RECEIVER_ID {
            return Err(Erc721Error::NonReceiver);
        }
        Ok(())
    }

    // 执行安全转账并调用 onERC721Received
    pub fn safe_transfer<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        token_id: U256,
        from: Address,
        to: Address,
        data: Vec<u8>,
    ) -> Result<(), Erc721Error> {
        storage.borrow_mut().transfer(token_id, from, to)?;
        Self::call_receiver(storage, token_id, from, to, data)
    }

    // 连续铸造 count 个 token 给 to，只在批次起点和检查点写入拥有者
    pub fn mint_batch(&mut self, to: Address, count: U256) -> Result<(U256, U256), Erc721Error> {
        if to.is_zero() {
            return Err(Erc721Error::MintToZero);
        }
        if count.is_zero() {
            return Err(Erc721Error::MintZeroQuantity);
        }
        if count > U256::from(MAX_BATCH_SIZE) {
            return Err(Erc721Error::ExceededMaxBatchMint);
        }
        let start = self.total_supply.get();
        let end = start
            .checked_add(count)
            .ok_or(Erc721Error::SupplyOverflow)?;
        let balance = self
            .balances
            .get(to)
            .checked_add(count)
            .ok_or(Erc721Error::SupplyOverflow)?;
        self.balances.insert(to, balance);
        self.total_supply.set(end);
        // 批次起点以及批次内每个检查点都记录拥有者
        self.owners.insert(start, to);
        let interval = U256::from(OWNERSHIP_CHECKPOINT_INTERVAL);
        let mut checkpoint = (start / interval + U256::from(1)) * interval;
        while checkpoint < end {
            self.owners.insert(checkpoint, to);
            checkpoint += interval;
        }
        let mut token_id = start;
        while token_id < end {
            log(
                self.vm(),
                Transfer {
                    from: Address::ZERO,
                    to,
                    token_id,
                },
            );
            token_id += U256::from(1);
        }
        Ok((start, end))
    }

    // 批量铸造并对合约接收者逐个检查 onERC721Received
    pub fn safe_mint<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        to: Address,
        count: U256,
    ) -> Result<(), Erc721Error> {
        let (start, end) = storage.borrow_mut().mint_batch(to, count)?;
        let mut token_id = start;
        while token_id < end {
            Self::call_receiver(storage, token_id, Address::ZERO, to, vec![])?;
            token_id += U256::from(1);
        }
        Ok(())
    }
}

// 实现 ERC-721 外部方法
#[public]
impl<T: Erc721Params> Erc721<T> {
    // 获取 NFT 名称
    pub fn name() -> Result<String, Erc721Error> {
        Ok(T::NAME.into())
    }

    // 获取 NFT 符号
    pub fn symbol() -> Result<String, Erc721Error> {
        Ok(T::SYMBOL.into())
    }

    // 获取指定 token 的 URI
    #[selector(name = "tokenURI")]
    pub fn token_uri(&self, token_id: U256) -> Result<String, Erc721Error> {
        // 确保 token 存在
        self.owner_of(token_id)?;
        Ok(T::token_uri(&self.base_uri(), token_id))
    }

    // 获取指定地址的 NFT 余额
    pub fn balance_of(&self, owner: Address) -> Result<U256, Erc721Error> {
        if owner.is_zero() {
            return Err(Erc721Error::ZeroAddressOwner);
        }
        Ok(self.balances.get(owner))
    }

    // 获取指定 token 的拥有者，向前查找最近的拥有者记录，
    // 检查点保证最多读取 OWNERSHIP_CHECKPOINT_INTERVAL 个槽位
    pub fn owner_of(&self, token_id: U256) -> Result<Address, Erc721Error> {
        if token_id >= self.total_supply.get() {
            return Err(Erc721Error::InvalidTokenId);
        }
        let mut cursor = token_id;
        loop {
            let owner = self.owners.get(cursor);
            if !owner.is_zero() {
                return Ok(owner);
            }
            if cursor.is_zero() {
                return Err(Erc721Error::InvalidTokenId);
            }
            cursor -= U256::from(1);
        }
    }

    // 执行带数据的安全转账
    #[selector(name = "safeTransferFrom")]
    pub fn safe_transfer_from_with_data<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        from: Address,
        to: Address,
        token_id: U256,
        data: Bytes,
    ) -> Result<(), Erc721Error> {
        // 检查调用者是否有权限
        storage.borrow_mut().require_authorized_to_spend(token_id)?;
        // 执行安全转账
        Self::safe_transfer(storage, token_id, from, to, data.0)
    }

    // 执行不带数据的安全转账
    #[selector(name = "safeTransferFrom")]
    pub fn safe_transfer_from<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Erc721Error> {
        Self::safe_transfer_from_with_data(storage, from, to, token_id, Bytes(vec![]))
    }

    // 执行普通转账
    pub fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Erc721Error> {
        self.require_authorized_to_spend(token_id)?;
        self.transfer(token_id, from, to)
    }

    // 为指定 token 设置授权
    pub fn approve(&mut self, approved: Address, token_id: U256) -> Result<(), Erc721Error> {
        let owner = self.owner_of(token_id)?;
        if approved == owner {
            return Err(Erc721Error::ApprovalToCurrentOwner);
        }
        // 只有拥有者或其操作者可以授权
        let sender = self.vm().msg_sender();
        if sender != owner && !self.operator_approvals.getter(owner).get(sender) {
            return Err(Erc721Error::ApproveCallerNotAuthorized);
        }
        self.token_approvals.insert(token_id, approved);
        log(
            self.vm(),
            Approval {
                owner,
                approved,
                token_id,
            },
        );
        Ok(())
    }

    // 设置批量授权
    pub fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
    ) -> Result<(), Erc721Error> {
        let owner = self.vm().msg_sender();
        if operator == owner {
            return Err(Erc721Error::ApproveToCaller);
        }
        self.operator_approvals
            .setter(owner)
            .insert(operator, approved);
        log(
            self.vm(),
            ApprovalForAll {
                owner,
                operator,
                approved,
            },
        );
        Ok(())
    }

    // 获取指定 token 的授权地址
    pub fn get_approved(&self, token_id: U256) -> Result<Address, Erc721Error> {
        self.owner_of(token_id)?;
        Ok(self.token_approvals.get(token_id))
    }

    // 检查是否为所有者设置了操作者授权
    pub fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> Result<bool, Erc721Error> {
        Ok(self.operator_approvals.getter(owner).get(operator))
    }

    // 检查是否支持指定接口
    pub fn supports_interface(interface: FixedBytes<4>) -> Result<bool, Erc721Error> {
        let interface_id = u32::from_be_bytes(interface.0);
        // 特殊处理 ERC165 标准中的 0xffffffff
        if interface_id == 0xffffffff {
            return Ok(false);
        }
        const IERC165: u32 = 0x01ffc9a7;
        const IERC721: u32 = 0x80ac58cd;
        const IERC721_METADATA: u32 = 0x5b5e139f;
        Ok(matches!(
            interface_id,
            IERC165 | IERC721 | IERC721_METADATA
        ))
    }
}
