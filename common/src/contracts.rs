// common/src/contracts.rs
//
// Bindings for the handful of MCD entry points the client touches.
#![allow(clippy::too_many_arguments)]

use ethers::contract::abigen;

abigen!(
    Vat,
    r#"[
        function live() external view returns (uint256)
        function can(address bit, address usr) external view returns (uint256)
        function hope(address usr) external
        function ilks(bytes32 ilk) external view returns (uint256 Art, uint256 rate, uint256 spot, uint256 line, uint256 dust)
        function urns(bytes32 ilk, address urn) external view returns (uint256 ink, uint256 art)
        function gem(bytes32 ilk, address usr) external view returns (uint256)
        function dai(address usr) external view returns (uint256)
        function debt() external view returns (uint256)
        function Line() external view returns (uint256)
        function frob(bytes32 i, address u, address v, address w, int256 dink, int256 dart) external
    ]"#
);

// GemJoin and DaiJoin share this surface.
abigen!(
    TokenAdapter,
    r#"[
        function join(address usr, uint256 wad) external
        function exit(address usr, uint256 wad) external
    ]"#
);

// `deposit` only exists on the wrapped native token.
abigen!(
    Token,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function deposit() external payable
    ]"#
);
