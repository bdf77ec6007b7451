// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        license::LicenseDeniedBody,
        middleware::{enforce_module, enforce_role, ModuleGuard, RoleGuard},
        RolePredicate,
    },
    licensing::{module::FINANCE, SubscriptionStatus, TenantLicense},
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod modules;
pub mod session;
pub mod tenant;

pub fn router(state: AppState) -> Router {
    // Every route under /finance belongs to the finance module
    let finance_routes: Router<AppState> = Router::new()
        .route("/finance/ping", get(modules::finance_ping))
        .route_layer(from_fn_with_state(
            ModuleGuard::new(state.gate.clone(), FINANCE),
            enforce_module,
        ));

    let admin_routes: Router<AppState> = Router::new()
        .route(
            "/admin/tenants/{tenant_id}/license",
            get(admin::get_license),
        )
        .route(
            "/admin/tenants/{tenant_id}/modules/{module_id}",
            put(admin::grant_module).delete(admin::revoke_module),
        )
        .route("/admin/tenants/{tenant_id}/status", put(admin::set_status))
        .route_layer(from_fn_with_state(
            RoleGuard::new(state.gate.clone(), RolePredicate::SuperAdmin),
            enforce_role,
        ));

    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/modules", get(session::list_modules))
        .route("/modules/{module_id}/access", get(modules::check_access))
        .route("/tenant/license", get(tenant::get_tenant_license))
        .route("/crm/ping", get(modules::crm_ping))
        .merge(finance_routes)
        .merge(admin_routes);

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .with_state(state);

    app.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        session::get_session,
        session::list_modules,
        modules::check_access,
        modules::crm_ping,
        modules::finance_ping,
        tenant::get_tenant_license,
        admin::get_license,
        admin::grant_module,
        admin::revoke_module,
        admin::set_status
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            session::SessionResponse,
            session::CatalogEntry,
            session::CatalogResponse,
            modules::ModuleAccessResponse,
            admin::UpdateStatusRequest,
            LicenseDeniedBody,
            TenantLicense,
            SubscriptionStatus
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Session", description = "Caller identity and module catalog"),
        (name = "Modules", description = "Module entitlement checks"),
        (name = "Tenant", description = "Tenant administration"),
        (name = "Admin", description = "Platform licensing administration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenVerifier;
    use crate::licensing::InMemoryLicenseStore;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_serves_docs_and_gates_v1() {
        let state = AppState::new(
            TokenVerifier::hs256(b"router"),
            Arc::new(InMemoryLicenseStore::new()),
        );
        let app = router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/api-doc/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/v1/crm/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_documents_bearer_scheme_and_gate_routes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(doc.paths.paths.contains_key("/v1/modules/{module_id}/access"));
        assert!(doc.paths.paths.contains_key("/v1/finance/ping"));
    }
}
