//! Shared response envelope types for the admin API.
//!
//! Admin responses use a `{ "data": ... }` envelope. The extension-facing
//! endpoints (`/licencas/validar`, `/pagbank/webhook`) keep their own flat
//! bodies because existing clients parse them.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
