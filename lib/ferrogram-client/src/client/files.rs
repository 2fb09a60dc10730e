// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Chunked file downloads, including [CDN redirects] with streamed
//! decryption and hash verification.
//!
//! [CDN redirects]: https://core.telegram.org/cdn
use super::net::TRANSFER_REQUEST_TIMEOUT;
use super::ClientHandle;
use ferrogram_crypto::CdnCipher;
use ferrogram_mtsender::{InvocationError, RpcError};
use ferrogram_tl::{self as tl, RemoteCall, Serializable};
use log::{info, warn};
use sha2::{Digest, Sha256};
use tokio::sync::OwnedSemaphorePermit;

pub const MIN_CHUNK_SIZE: i32 = 4 * 1024;
pub const MAX_CHUNK_SIZE: i32 = 512 * 1024;

/// Iterator-like downloader over the contents of a file.
///
/// Chunks are fetched lazily on every [`DownloadIter::next`] call; the
/// iterator bounds itself with the client's transmission semaphore for
/// as long as it lives.
pub struct DownloadIter {
    client: ClientHandle,
    done: bool,
    /// Datacenter the file lives in, when it is not the home one.
    dc_id: Option<i32>,
    request: tl::functions::upload::GetFile,
    cdn: Option<CdnRedirect>,
    permit: Option<OwnedSemaphorePermit>,
}

struct CdnRedirect {
    dc_id: i32,
    file_token: Vec<u8>,
    cipher: CdnCipher,
}

impl DownloadIter {
    fn new(client: &ClientHandle, location: tl::enums::InputFileLocation) -> Self {
        Self {
            client: client.clone(),
            done: false,
            dc_id: None,
            request: tl::functions::upload::GetFile {
                precise: false,
                cdn_supported: true,
                location,
                offset: 0,
                limit: MAX_CHUNK_SIZE,
            },
            cdn: None,
            permit: None,
        }
    }

    /// Download from a specific datacenter, as indicated by the file's
    /// origin. A short-lived media session to it is used instead of the
    /// home connection.
    pub fn in_dc(mut self, dc_id: i32) -> Self {
        self.dc_id = Some(dc_id);
        self
    }

    /// Changes the chunk size, in bytes, used to make requests.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not divisible by [`MIN_CHUNK_SIZE`] or is out
    /// of the `MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE` range.
    pub fn chunk_size(mut self, size: i32) -> Self {
        assert!((MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) && size % MIN_CHUNK_SIZE == 0);
        self.request.limit = size;
        self
    }

    /// Skips `n` chunks to start downloading at a different offset.
    pub fn skip_chunks(mut self, n: i32) -> Self {
        self.request.offset += (self.request.limit as i64) * (n as i64);
        self
    }

    /// Fetch and return the next chunk, or `None` when the download is
    /// complete.
    pub async fn next(&mut self) -> Result<Option<Vec<u8>>, InvocationError> {
        if self.done {
            return Ok(None);
        }

        if self.permit.is_none() {
            self.permit = Some(
                self.client
                    .shared
                    .get_file_semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("transmission semaphore closed"),
            );
        }

        if self.cdn.is_some() {
            return self.next_cdn_chunk().await;
        }

        use tl::enums::upload::File;

        match self.origin_invoke(&self.request).await? {
            File::File(f) => {
                if f.bytes.len() < self.request.limit as usize {
                    self.done = true;
                    if f.bytes.is_empty() {
                        return Ok(None);
                    }
                }

                self.request.offset += self.request.limit as i64;
                Ok(Some(f.bytes))
            }
            File::CdnRedirect(redirect) => {
                info!(
                    "download redirected to cdn dc {} at offset {}",
                    redirect.dc_id, self.request.offset
                );

                let key: [u8; 32] = redirect
                    .encryption_key
                    .as_slice()
                    .try_into()
                    .map_err(|_| cdn_hash_mismatch())?;
                let iv: [u8; 16] = redirect
                    .encryption_iv
                    .as_slice()
                    .try_into()
                    .map_err(|_| cdn_hash_mismatch())?;

                self.cdn = Some(CdnRedirect {
                    dc_id: redirect.dc_id,
                    file_token: redirect.file_token,
                    cipher: CdnCipher::new(key, iv),
                });
                self.next_cdn_chunk().await
            }
        }
    }

    /// Fetch one chunk from the CDN, decrypt it, and verify it against
    /// the origin datacenter's hashes.
    async fn next_cdn_chunk(&mut self) -> Result<Option<Vec<u8>>, InvocationError> {
        let cdn = self.cdn.as_ref().expect("cdn state must exist");
        let cdn_handle = self.client.media_handle(cdn.dc_id, true).await?;

        let mut reuploaded = false;
        loop {
            let cdn = self.cdn.as_ref().expect("cdn state must exist");
            let response = self
                .client
                .do_invoke(
                    &cdn_handle,
                    tl::functions::upload::GetCdnFile {
                        file_token: cdn.file_token.clone(),
                        offset: self.request.offset,
                        limit: self.request.limit,
                    }
                    .to_bytes(),
                    TRANSFER_REQUEST_TIMEOUT,
                )
                .await
                .and_then(|body| {
                    use tl::Deserializable;
                    tl::enums::upload::CdnFile::from_bytes(&body).map_err(|e| e.into())
                })?;

            match response {
                tl::enums::upload::CdnFile::ReuploadNeeded(r) => {
                    // The CDN no longer holds this part; the origin has
                    // to push it there again, once, before retrying.
                    if reuploaded {
                        warn!("cdn still missing the file after a reupload");
                        return Err(cdn_hash_mismatch());
                    }
                    reuploaded = true;

                    info!("cdn asked the origin dc to reupload the file");
                    let file_token = cdn.file_token.clone();
                    self.origin_invoke(&tl::functions::upload::ReuploadCdnFile {
                        file_token,
                        request_token: r.request_token,
                    })
                    .await?;
                }
                tl::enums::upload::CdnFile::File(f) => {
                    let mut bytes = f.bytes;
                    cdn.cipher.decrypt_chunk(self.request.offset as u64, &mut bytes);

                    let file_token = cdn.file_token.clone();
                    let hashes = self
                        .origin_invoke(&tl::functions::upload::GetCdnFileHashes {
                            file_token,
                            offset: self.request.offset,
                        })
                        .await?;
                    verify_cdn_chunk(&bytes, &hashes)?;

                    if bytes.len() < self.request.limit as usize {
                        self.done = true;
                        if bytes.is_empty() {
                            return Ok(None);
                        }
                    }

                    self.request.offset += self.request.limit as i64;
                    return Ok(Some(bytes));
                }
            }
        }
    }

    /// Invoke a request against the datacenter that owns the file.
    async fn origin_invoke<R: RemoteCall>(
        &self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        match self.dc_id {
            Some(dc_id) => self.client.invoke_in_dc(dc_id, request).await,
            None => {
                self.client
                    .invoke_with_timeout(request, TRANSFER_REQUEST_TIMEOUT)
                    .await
            }
        }
    }
}

/// Check a decrypted CDN chunk against the SHA-256 hashes provided by
/// the origin datacenter. A mismatch means the CDN served tampered or
/// corrupt data and is terminal for the download.
fn verify_cdn_chunk(bytes: &[u8], hashes: &[tl::enums::FileHash]) -> Result<(), InvocationError> {
    for (i, tl::enums::FileHash::Hash(hash)) in hashes.iter().enumerate() {
        let limit = hash.limit as usize;
        let start = (limit * i).min(bytes.len());
        let end = (limit * (i + 1)).min(bytes.len());
        let part = &bytes[start..end];
        if part.is_empty() {
            break;
        }

        let digest: [u8; 32] = Sha256::digest(part).into();
        if digest[..] != hash.hash[..] {
            warn!("cdn chunk hash mismatch at offset {}", hash.offset);
            return Err(cdn_hash_mismatch());
        }
    }
    Ok(())
}

/// The error surfaced when a CDN chunk fails integrity verification,
/// shaped like the RPC error other libraries raise so callers can match
/// on its name.
fn cdn_hash_mismatch() -> InvocationError {
    InvocationError::Rpc(RpcError {
        code: 500,
        name: "CDN_FILE_HASH_MISMATCH".into(),
        value: None,
        caused_by: None,
    })
}

impl ClientHandle {
    /// Returns a new iterator over the contents of a file.
    pub fn iter_download(&self, location: tl::enums::InputFileLocation) -> DownloadIter {
        DownloadIter::new(self, location)
    }

    /// Reserve one upload slot.
    ///
    /// Uploads are composed by callers out of `upload.saveFilePart`
    /// calls; holding a permit while doing so keeps the number of
    /// concurrent transmissions bounded, like downloads are.
    pub async fn acquire_upload_permit(&self) -> OwnedSemaphorePermit {
        self.shared
            .save_file_semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("transmission semaphore closed")
    }

    /// Convenience method to download an entire file into memory.
    pub async fn download(
        &self,
        location: tl::enums::InputFileLocation,
    ) -> Result<Vec<u8>, InvocationError> {
        let mut data = Vec::new();
        let mut parts = self.iter_download(location);
        while let Some(chunk) = parts.next().await? {
            data.extend(chunk);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(data: &[u8]) -> Vec<u8> {
        let digest: [u8; 32] = Sha256::digest(data).into();
        digest.to_vec()
    }

    #[test]
    fn chunk_verification_accepts_good_hashes() {
        let data = vec![7u8; 1024];
        let hashes = vec![
            tl::enums::FileHash::Hash(tl::types::FileHash {
                offset: 0,
                limit: 512,
                hash: hash_of(&data[..512]),
            }),
            tl::enums::FileHash::Hash(tl::types::FileHash {
                offset: 512,
                limit: 512,
                hash: hash_of(&data[512..]),
            }),
        ];

        assert!(verify_cdn_chunk(&data, &hashes).is_ok());
    }

    #[test]
    fn chunk_verification_rejects_tampered_data() {
        let mut data = vec![7u8; 1024];
        let hashes = vec![tl::enums::FileHash::Hash(tl::types::FileHash {
            offset: 0,
            limit: 1024,
            hash: hash_of(&data),
        })];

        data[100] ^= 0xff;
        let err = verify_cdn_chunk(&data, &hashes).unwrap_err();
        assert!(err.is("CDN_FILE_HASH_MISMATCH"));
    }

    #[test]
    fn short_final_chunk_is_still_verified() {
        let data = vec![3u8; 700];
        let hashes = vec![
            tl::enums::FileHash::Hash(tl::types::FileHash {
                offset: 0,
                limit: 512,
                hash: hash_of(&data[..512]),
            }),
            tl::enums::FileHash::Hash(tl::types::FileHash {
                offset: 512,
                limit: 512,
                hash: hash_of(&data[512..]),
            }),
        ];

        assert!(verify_cdn_chunk(&data, &hashes).is_ok());

        let bad = vec![tl::enums::FileHash::Hash(tl::types::FileHash {
            offset: 0,
            limit: 512,
            hash: hash_of(&data[..100]),
        })];
        assert!(verify_cdn_chunk(&data, &bad).is_err());
    }
}
