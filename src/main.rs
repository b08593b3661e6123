#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

#[cfg(not(any(test, feature = "export-abi")))]
#[no_mangle]
pub extern "C" fn main() {}

// 导出合约的 Solidity ABI
#[cfg(feature = "export-abi")]
fn main() {
    i_am_ukrainian::print_from_args();
}
