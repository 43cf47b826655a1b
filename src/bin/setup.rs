//! Idempotent provisioning for the InPost integration: ensures the
//! Poland region, tax region, fulfillment set, and shipping option
//! exist on the store platform. Safe to run repeatedly.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use inpost_gateway::error::AppError;
use inpost_gateway::platform::{
    CreateFulfillmentSet, CreateRegion, CreateServiceZone, CreateShippingOption, CreateTaxRegion,
    GeoZone, PlatformClient, ShippingOptionRule, ShippingOptionType,
};
use inpost_gateway::provider::{InpostProvider, SERVICE_LOCKER_STANDARD};

const REGION_NAME: &str = "Poland";
const FULFILLMENT_SET_NAME: &str = "Poland InPost Delivery";
const SHIPPING_OPTION_NAME: &str = "Paczkomaty InPost";
const SHIPPING_OPTION_DESCRIPTION: &str = "Dostawa do wybranego Paczkomatu InPost";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        ))
        .with_target(false)
        .compact()
        .init();

    let base_url =
        env::var("PLATFORM_API_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
    let admin_token = env::var("PLATFORM_ADMIN_TOKEN")
        .map_err(|_| AppError::InvalidData("PLATFORM_ADMIN_TOKEN is required".to_string()))?;

    let client = PlatformClient::new(&base_url, &admin_token)?;

    info!("setting up InPost integration");

    ensure_region(&client).await?;
    ensure_tax_region(&client).await?;
    let shipping_profile_id = require_default_shipping_profile(&client).await?;
    let fulfillment_set = ensure_fulfillment_set(&client).await?;
    ensure_shipping_option(&client, &fulfillment_set, &shipping_profile_id).await?;

    info!("InPost integration setup completed");
    info!("set a Polish address in checkout and select '{SHIPPING_OPTION_NAME}' as shipping method");

    Ok(())
}

async fn ensure_region(client: &PlatformClient) -> Result<(), AppError> {
    let regions = client.list_regions().await?;

    if regions.iter().any(|region| region.name == REGION_NAME) {
        info!("{REGION_NAME} region already exists");
        return Ok(());
    }

    info!("creating {REGION_NAME} region");
    client
        .create_region(&CreateRegion {
            name: REGION_NAME.to_string(),
            currency_code: "pln".to_string(),
            countries: vec!["pl".to_string()],
            payment_providers: vec!["pp_system_default".to_string()],
        })
        .await?;

    Ok(())
}

async fn ensure_tax_region(client: &PlatformClient) -> Result<(), AppError> {
    client
        .create_tax_region(&CreateTaxRegion {
            country_code: "pl".to_string(),
            provider_id: "tp_system".to_string(),
        })
        .await?;

    info!("tax region for pl in place");
    Ok(())
}

async fn require_default_shipping_profile(client: &PlatformClient) -> Result<String, AppError> {
    let profiles = client.list_default_shipping_profiles().await?;

    profiles
        .into_iter()
        .next()
        .map(|profile| profile.id)
        .ok_or_else(|| {
            AppError::UnexpectedState(
                "no default shipping profile found; run the platform seed first".to_string(),
            )
        })
}

async fn ensure_fulfillment_set(
    client: &PlatformClient,
) -> Result<inpost_gateway::platform::FulfillmentSet, AppError> {
    let sets = client.list_fulfillment_sets().await?;

    if let Some(set) = sets.into_iter().find(|set| set.name == FULFILLMENT_SET_NAME) {
        info!("using existing {FULFILLMENT_SET_NAME} fulfillment set");
        return Ok(set);
    }

    info!("creating {FULFILLMENT_SET_NAME} fulfillment set");
    client
        .create_fulfillment_set(&CreateFulfillmentSet {
            name: FULFILLMENT_SET_NAME.to_string(),
            set_type: "shipping".to_string(),
            service_zones: vec![CreateServiceZone {
                name: REGION_NAME.to_string(),
                geo_zones: vec![GeoZone {
                    zone_type: "country".to_string(),
                    country_code: "pl".to_string(),
                }],
            }],
        })
        .await
}

async fn ensure_shipping_option(
    client: &PlatformClient,
    fulfillment_set: &inpost_gateway::platform::FulfillmentSet,
    shipping_profile_id: &str,
) -> Result<(), AppError> {
    let options = client.list_shipping_options().await?;

    if options
        .iter()
        .any(|option| option.name == SHIPPING_OPTION_NAME)
    {
        info!("{SHIPPING_OPTION_NAME} shipping option already exists");
        return Ok(());
    }

    let service_zone = fulfillment_set.service_zones.first().ok_or_else(|| {
        AppError::UnexpectedState("fulfillment set has no service zone".to_string())
    })?;

    info!("creating {SHIPPING_OPTION_NAME} shipping option");
    client
        .create_shipping_option(&CreateShippingOption {
            name: SHIPPING_OPTION_NAME.to_string(),
            price_type: "calculated".to_string(),
            provider_id: InpostProvider::IDENTIFIER.to_string(),
            service_zone_id: service_zone.id.clone(),
            shipping_profile_id: shipping_profile_id.to_string(),
            option_type: ShippingOptionType {
                label: SHIPPING_OPTION_NAME.to_string(),
                description: SHIPPING_OPTION_DESCRIPTION.to_string(),
                code: SERVICE_LOCKER_STANDARD.to_string(),
            },
            rules: vec![
                ShippingOptionRule {
                    attribute: "enabled_in_store".to_string(),
                    value: "true".to_string(),
                    operator: "eq".to_string(),
                },
                ShippingOptionRule {
                    attribute: "is_return".to_string(),
                    value: "false".to_string(),
                    operator: "eq".to_string(),
                },
            ],
        })
        .await?;

    Ok(())
}
