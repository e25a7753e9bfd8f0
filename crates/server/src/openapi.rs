use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Body accepted by create and update. Unknown fields are stored as-is.
#[derive(ToSchema)]
pub struct PropertyInputDoc {
    pub title: String,
    pub address: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub suites: f64,
    pub built_area: f64,
    pub total_area: f64,
    pub price: f64,
    pub condition: String,
    pub description: String,
    pub cover_image_url: String,
    pub photos_google_drive_link: String,
}

#[derive(ToSchema)]
pub struct PropertyDoc {
    pub id: String,
    pub title: String,
    pub address: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub suites: f64,
    pub built_area: f64,
    pub total_area: f64,
    pub price: f64,
    pub condition: String,
    pub description: String,
    pub cover_image_url: String,
    pub photos_google_drive_link: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::properties::list_properties,
        crate::routes::properties::get_property,
        crate::routes::properties::create_property,
        crate::routes::properties::update_property,
        crate::routes::properties::delete_property,
    ),
    components(
        schemas(
            HealthResponse,
            PropertyInputDoc,
            PropertyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "properties")
    )
)]
pub struct ApiDoc;
