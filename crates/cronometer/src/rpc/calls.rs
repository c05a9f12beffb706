//! The RPC calls this client makes, and the protocol constants they use.

use super::codec::{RpcRequest, RpcValue, TypeTag, TypedArg};

// ============================================================================
// Protocol Constants
// ============================================================================

/// Strong name of the service interface.
pub const SERVICE_STRONG_NAME: &str = "2D6A926E3729946302DC68073CB0D550";

/// Strong name of the compiled client permutation, sent as a header.
pub const PERMUTATION_STRONG_NAME: &str = "7B121DC5483BF272B1BC1916DA9FA963";

/// Fully qualified service interface name.
pub const SERVICE_NAME: &str = "com.cronometer.shared.rpc.CronometerService";

/// Content type of RPC request bodies.
pub const RPC_CONTENT_TYPE: &str = "text/x-gwt-rpc; charset=UTF-8";

/// Header carrying the module base.
pub const MODULE_BASE_HEADER: &str = "x-gwt-module-base";

/// Header carrying the permutation strong name.
pub const PERMUTATION_HEADER: &str = "x-gwt-permutation";

/// Enum type of the authorization scope.
pub const AUTH_SCOPE: TypeTag = TypeTag::new("com.cronometer.shared.user.AuthScope/2065601159");

/// Ordinal of the scope that grants export access.
pub const EXPORT_SCOPE_ORDINAL: u32 = 2;

/// Requested lifetime of an authorization token, in seconds.
pub const TOKEN_VALIDITY_SECS: i64 = 3600;

/// Timezone offset, in minutes, sent with `authenticate`.
pub const TIMEZONE_OFFSET_MINUTES: i64 = -480;

// ============================================================================
// Method Names
// ============================================================================

pub const AUTHENTICATE: &str = "authenticate";

pub const GENERATE_AUTHORIZATION_TOKEN: &str = "generateAuthorizationToken";

// ============================================================================
// Requests
// ============================================================================

/// Request establishing the RPC session after a form login.
pub fn authenticate(module_base: &str) -> RpcRequest {
    RpcRequest {
        module_base: module_base.to_string(),
        service_strong_name: SERVICE_STRONG_NAME,
        service_name: SERVICE_NAME,
        method: AUTHENTICATE,
        args: vec![TypedArg::new(
            TypeTag::INTEGER,
            RpcValue::Boxed(TIMEZONE_OFFSET_MINUTES),
        )],
    }
}

/// Request minting a time-boxed export token.
pub fn generate_authorization_token(module_base: &str, nonce: &str, user_id: i64) -> RpcRequest {
    RpcRequest {
        module_base: module_base.to_string(),
        service_strong_name: SERVICE_STRONG_NAME,
        service_name: SERVICE_NAME,
        method: GENERATE_AUTHORIZATION_TOKEN,
        args: vec![
            TypedArg::new(TypeTag::STRING, RpcValue::Str(nonce.to_string())),
            TypedArg::new(TypeTag::INT, RpcValue::Int(user_id)),
            TypedArg::new(TypeTag::INT, RpcValue::Int(TOKEN_VALIDITY_SECS)),
            TypedArg::new(AUTH_SCOPE, RpcValue::Enum(EXPORT_SCOPE_ORDINAL)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE_BASE: &str = "https://cronometer.com/cronometer/";

    #[test]
    fn authenticate_frame() {
        assert_eq!(
            authenticate(MODULE_BASE).encode(),
            "7|0|5|https://cronometer.com/cronometer/|2D6A926E3729946302DC68073CB0D550|\
             com.cronometer.shared.rpc.CronometerService|authenticate|\
             java.lang.Integer/3438268394|1|2|3|4|1|5|5|-480|"
        );
    }

    #[test]
    fn generate_authorization_token_frame() {
        assert_eq!(
            generate_authorization_token(MODULE_BASE, "N1", 42).encode(),
            "7|0|8|https://cronometer.com/cronometer/|2D6A926E3729946302DC68073CB0D550|\
             com.cronometer.shared.rpc.CronometerService|generateAuthorizationToken|\
             java.lang.String/2004016611|I|com.cronometer.shared.user.AuthScope/2065601159|N1|\
             1|2|3|4|4|5|6|6|7|8|42|3600|7|2|"
        );
    }
}
