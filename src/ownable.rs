use alloc::vec::Vec;
use alloy_primitives::Address;
use alloy_sol_types::sol;
use stylus_sdk::{prelude::*, stylus_core::log};

use crate::revert::RevertReason;

// 单一管理员的访问控制存储
sol_storage! {
    pub struct Ownable {
        // 当前合约拥有者
        address owner;
    }
}

sol! {
    // 所有权转移事件
    event OwnershipTransferred(address indexed previous_owner, address indexed new_owner);
}

// 所有权相关错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnableError {
    // 调用者不是拥有者
    CallerNotOwner,
    // 新拥有者为零地址
    ZeroOwner,
}

impl RevertReason for OwnableError {
    fn reason(&self) -> &'static str {
        match self {
            OwnableError::CallerNotOwner => "Ownable: caller is not the owner",
            OwnableError::ZeroOwner => "Ownable: new owner is the zero address",
        }
    }
}

impl From<OwnableError> for Vec<u8> {
    fn from(err: OwnableError) -> Vec<u8> {
        err.encode()
    }
}

// 内部方法
impl Ownable {
    // 设置初始拥有者，仅在部署时调用
    pub fn initialize(&mut self, initial_owner: Address) -> Result<(), OwnableError> {
        if initial_owner.is_zero() {
            return Err(OwnableError::ZeroOwner);
        }
        self.set_owner(initial_owner);
        Ok(())
    }

    // 要求调用者为拥有者
    pub fn only_owner(&self) -> Result<(), OwnableError> {
        if self.vm().msg_sender() != self.owner.get() {
            return Err(OwnableError::CallerNotOwner);
        }
        Ok(())
    }

    fn set_owner(&mut self, new_owner: Address) {
        let previous_owner = self.owner.get();
        self.owner.set(new_owner);
        log(
            self.vm(),
            OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
    }
}

// 外部方法
#[public]
impl Ownable {
    // 当前拥有者
    pub fn owner(&self) -> Result<Address, OwnableError> {
        Ok(self.owner.get())
    }

    // 转移所有权
    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), OwnableError> {
        self.only_owner()?;
        if new_owner.is_zero() {
            return Err(OwnableError::ZeroOwner);
        }
        self.set_owner(new_owner);
        Ok(())
    }

    // 放弃所有权，之后所有 only_owner 方法都不可用
    pub fn renounce_ownership(&mut self) -> Result<(), OwnableError> {
        self.only_owner()?;
        self.set_owner(Address::ZERO);
        Ok(())
    }
}
