//! access token 検証 → Identity を extensions に入れる
//!
//! - token なし: `Identity::Anonymous` を入れて通す (拒否するかは extractor/handler 側の方針)
//! - token あり & 検証失敗: 401 (reason: "token expired" / "invalid token")
//! - token あり & 検証成功: `Identity::Authenticated` を入れて通す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 署名 (HS256) + exp の検証は AuthGate 側で実施
    let identity = state.auth.authenticate(req.headers())?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
