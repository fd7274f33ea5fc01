/// NFT handlers: metadata lookup, like toggle, upload and storage proxy
use crate::domain::LikeRecord;
use crate::error::{AppError, Result};
use crate::handlers::multipart::{read_form, MAX_FORM_BYTES};
use crate::services::{image, Dimensions, GatewayClient, LikeService, NftStorageClient};
use actix_middleware::AuthenticatedWallet;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct CreateLikeRequest {
    pub cid: Option<String>,
}

/// `metadata` form field of an NFT upload
#[derive(Debug, Deserialize)]
pub struct UploadMetadata {
    pub width: u32,
    pub height: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub cid: String,
    pub url: String,
}

/// Overlay upstream metadata on the stored like record
///
/// Upstream keys win on collision. Without a record, or when upstream is not
/// a JSON object, upstream is returned untouched.
pub fn merge_metadata(record: Option<&LikeRecord>, upstream: Value) -> Value {
    let (Some(record), Value::Object(fields)) = (record, &upstream) else {
        return upstream;
    };

    let mut merged = json!({ "_id": record.id, "likes": record.likes });
    if let Value::Object(target) = &mut merged {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// GET /api/v1/nft/metadata/{cid}
pub async fn get_metadata(
    cid: web::Path<String>,
    likes: web::Data<LikeService>,
    gateway: web::Data<GatewayClient>,
) -> Result<HttpResponse> {
    let cid = cid.into_inner();
    let upstream = gateway.fetch_metadata(&cid).await?;
    let record = likes.get_record(&cid).await?;

    Ok(HttpResponse::Ok().json(merge_metadata(record.as_ref(), upstream)))
}

/// PUT /api/v1/nft/create?wallet=<addr>
///
/// Toggles the caller's like on `cid`; the wallet was already proven to be
/// the token signer by the auth middleware.
pub async fn create_like(
    wallet: Option<AuthenticatedWallet>,
    body: web::Json<CreateLikeRequest>,
    likes: web::Data<LikeService>,
) -> Result<HttpResponse> {
    let AuthenticatedWallet(wallet) =
        wallet.ok_or_else(|| AppError::bad_request("wallet query parameter required"))?;
    let cid = body
        .into_inner()
        .cid
        .ok_or_else(|| AppError::bad_request("cid required"))?;

    let record = likes.toggle_like(&cid, &wallet).await?;
    Ok(HttpResponse::Accepted().json(record))
}

/// POST /api/v1/nft/upload
///
/// Converts the image, pins it, then pins a `metadata.json` pointing at it.
pub async fn upload_nft(
    payload: Multipart,
    pinning: web::Data<NftStorageClient>,
) -> Result<HttpResponse> {
    if !pinning.is_configured() {
        return Err(crate::services::PinningError::NotConfigured.into());
    }

    let mut form = read_form(payload, MAX_FORM_BYTES).await?;
    let metadata: UploadMetadata = form.json("metadata")?;
    let input = form.take("image")?;

    let dims = Dimensions {
        width: metadata.width,
        height: metadata.height,
    };
    let converted = image::convert(input, dims).await?;

    let image_cid = pinning
        .upload_bytes(converted.bytes, converted.content_type)
        .await?;

    let document = json!({
        "name": metadata.name,
        "description": metadata.description,
        "image": format!("ipfs://{}", image_cid),
    });
    let cid = pinning
        .upload_file(
            "metadata.json",
            serde_json::to_vec(&document)?,
            "application/json",
        )
        .await?;

    tracing::info!(%cid, %image_cid, name = %metadata.name, "NFT metadata pinned");

    Ok(HttpResponse::Ok().json(UploadResponse {
        url: format!("ipfs://{}/metadata.json", cid),
        cid,
    }))
}

/// GET /api/v1/nft/storage
pub async fn list_storage(pinning: web::Data<NftStorageClient>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(pinning.list().await?))
}

/// GET /api/v1/nft/storage/{cid}
pub async fn get_storage(
    cid: web::Path<String>,
    pinning: web::Data<NftStorageClient>,
) -> Result<HttpResponse> {
    let cid = cid.into_inner();
    if !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(format!("invalid content id {:?}", cid)));
    }
    Ok(HttpResponse::Ok().json(pinning.status(&cid).await?))
}
