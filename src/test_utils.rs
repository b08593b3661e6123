use alloc::vec::Vec;
use alloy_primitives::{address, Address};
use alloy_sol_types::SolEvent;
use stylus_sdk::testing::*;

use crate::IAmUkrainian;

// 测试账户
pub const ALICE: Address = address!("a11ce00000000000000000000000000000000a11");
pub const BOB: Address = address!("b0b0000000000000000000000000000000000b0b");
pub const CAROL: Address = address!("ca401000000000000000000000000000000ca401");
// 用作 ERC-721 接收合约的地址
pub const RECEIVER: Address = address!("2ece1e0000000000000000000000000002ece1e0");

// 以 owner 身份部署合约
pub fn deploy(vm: &TestVM, owner: Address) -> IAmUkrainian {
    vm.set_sender(owner);
    let mut contract = IAmUkrainian::from(vm);
    contract
        .constructor(owner)
        .expect("constructor should succeed");
    contract
}

// 解码 vm 中记录的指定类型事件
pub fn events<E: SolEvent>(vm: &TestVM) -> Vec<E> {
    vm.get_emitted_logs()
        .into_iter()
        .filter(|(topics, _)| topics.first() == Some(&E::SIGNATURE_HASH))
        .map(|(topics, data)| E::decode_raw_log(topics, &data, true).expect("event should decode"))
        .collect()
}
