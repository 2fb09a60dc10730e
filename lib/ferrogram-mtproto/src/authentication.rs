// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The steps required to generate an authorization key.
//!
//! Each step is a pure function from the previous step's state and the
//! server's response to the next request, which makes the whole exchange
//! testable without touching the network:
//!
//! ```no_run
//! use ferrogram_mtproto::authentication;
//!
//! fn send_data_to_server(request: &[u8]) -> Result<Vec<u8>, authentication::Error> {
//!     unimplemented!()
//! }
//!
//! fn main() -> Result<(), authentication::Error> {
//!     let (request, data) = authentication::step1()?;
//!     let response = send_data_to_server(&request)?;
//!
//!     let (request, data) = authentication::step2(data, &response)?;
//!     let response = send_data_to_server(&request)?;
//!
//!     let (request, mut data) = authentication::step3(data, &response)?;
//!     let mut response = send_data_to_server(&request)?;
//!
//!     let finished = loop {
//!         match authentication::create_key(data, &response)? {
//!             authentication::CreatedKey::Done(finished) => break finished,
//!             authentication::CreatedKey::Retry { request, data: retry } => {
//!                 response = send_data_to_server(&request)?;
//!                 data = retry;
//!             }
//!         }
//!     };
//!     // `finished.auth_key` can now encrypt messages to the server.
//!     Ok(())
//! }
//! ```
use ferrogram_crypto::{factorize::factorize, rsa, AuthKey};
use ferrogram_tl::{self as tl, Cursor, Deserializable, RemoteCall, Serializable};
use getrandom::getrandom;
use num_bigint::{BigUint, ToBigUint};
use sha1::{Digest, Sha1};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Represents an error that occurred during the generation of an
/// authorization key.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The response data was invalid and did not match our expectations.
    InvalidResponse {
        /// The inner error that caused the invalid response.
        error: tl::deserialize::Error,
    },

    /// The server's nonce did not match ours.
    InvalidNonce {
        got: [u8; 16],
        expected: [u8; 16],
    },

    /// The server's PQ number was not of the right size.
    InvalidPqSize {
        size: usize,
    },

    /// None of the server fingerprints are known to us.
    UnknownFingerprints {
        fingerprints: Vec<i64>,
    },

    /// The server failed to send the Diffie-Hellman parameters.
    DhParamsFail,

    /// The server's nonce has changed during the key exchange.
    InvalidServerNonce {
        got: [u8; 16],
        expected: [u8; 16],
    },

    /// The server's `encrypted_answer` is not correctly padded.
    EncryptedResponseNotPadded {
        len: usize,
    },

    /// An error occurred while trying to read the DH inner data.
    InvalidDhInnerData {
        error: tl::deserialize::Error,
    },

    /// Some parameter (`g`, `g_a` or `g_b`) was out of range.
    GParameterOutOfRange {
        value: BigUint,
        low: BigUint,
        high: BigUint,
    },

    /// The generation of Diffie-Hellman parameters failed for good.
    DhGenFail,

    /// The plaintext answer hash did not match.
    InvalidAnswerHash {
        got: [u8; 20],
        expected: [u8; 20],
    },

    /// The new nonce hash did not match.
    InvalidNewNonceHash {
        got: [u8; 16],
        expected: [u8; 16],
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResponse { error } => write!(f, "invalid server response: {}", error),
            Self::InvalidNonce { got, expected } => {
                write!(f, "invalid nonce: got {:?}, expected {:?}", got, expected)
            }
            Self::InvalidPqSize { size } => write!(f, "invalid pq size {}", size),
            Self::UnknownFingerprints { fingerprints } => {
                write!(f, "all server fingerprints are unknown: {:?}", fingerprints)
            }
            Self::DhParamsFail => write!(f, "the generation of DH parameters by the server failed"),
            Self::InvalidServerNonce { got, expected } => write!(
                f,
                "invalid server nonce: got {:?}, expected {:?}",
                got, expected
            ),
            Self::EncryptedResponseNotPadded { len } => write!(
                f,
                "the encrypted server response was {} bytes long, which is not correctly padded",
                len
            ),
            Self::InvalidDhInnerData { error } => {
                write!(f, "could not deserialize DH inner data: {}", error)
            }
            Self::GParameterOutOfRange { low, high, value } => write!(
                f,
                "the parameter g = {} was not in the range {}..{}",
                value, low, high
            ),
            Self::DhGenFail => write!(f, "the generation of DH parameters failed"),
            Self::InvalidAnswerHash { got, expected } => write!(
                f,
                "invalid answer hash: got {:?}, expected {:?}",
                got, expected
            ),
            Self::InvalidNewNonceHash { got, expected } => write!(
                f,
                "invalid new nonce hash: got {:?}, expected {:?}",
                got, expected
            ),
        }
    }
}

impl From<tl::deserialize::Error> for Error {
    fn from(error: tl::deserialize::Error) -> Self {
        Self::InvalidResponse { error }
    }
}

/// The data generated by [`step1`], needed for [`step2`].
pub struct Step1 {
    nonce: [u8; 16],
}

/// The data generated by [`step2`], needed for [`step3`].
pub struct Step2 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
}

/// Everything the client-DH round needs to run (and, on a retry
/// notification, to run again with a fresh secret).
#[derive(Debug)]
struct DhState {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
    g: BigUint,
    dh_prime: BigUint,
    g_a: BigUint,
    key: [u8; 32],
    iv: [u8; 32],
    time_offset: i32,
}

/// The data generated by [`step3`], needed for [`create_key`].
#[derive(Debug)]
pub struct Step3 {
    state: DhState,
    gab: BigUint,
}

/// The final result of the authorization handshake.
#[derive(Clone, Debug, PartialEq)]
pub struct Finished {
    pub auth_key: [u8; 256],
    pub time_offset: i32,
    pub first_salt: i64,
}

/// Outcome of [`create_key`]: either the exchange is complete, or the
/// server asked for the client-DH round to run again and the fresh
/// request is ready to be sent.
#[derive(Debug)]
pub enum CreatedKey {
    Done(Finished),
    Retry { request: Vec<u8>, data: Step3 },
}

/// The first step of the process to generate an authorization key.
pub fn step1() -> Result<(Vec<u8>, Step1), Error> {
    let random_bytes = {
        let mut buffer = [0; 16];
        getrandom(&mut buffer).expect("failed to generate secure data for auth key");
        buffer
    };

    do_step1(&random_bytes)
}

// n.b.: the `do_step` functions are deterministic so that they can be tested.
fn do_step1(random_bytes: &[u8; 16]) -> Result<(Vec<u8>, Step1), Error> {
    // Step 1. Generate a secure random nonce.
    let nonce = *random_bytes;
    Ok((
        tl::functions::ReqPqMulti { nonce }.to_bytes(),
        Step1 { nonce },
    ))
}

/// The second step of the process to generate an authorization key:
/// validate the PQ response, factorize PQ, and commit to `new_nonce`.
pub fn step2(data: Step1, response: &[u8]) -> Result<(Vec<u8>, Step2), Error> {
    let random_bytes = {
        let mut buffer = [0; 32 + 224];
        getrandom(&mut buffer).expect("failed to generate secure data for auth key");
        buffer
    };

    do_step2(data, response, &random_bytes)
}

fn do_step2(
    data: Step1,
    response: &[u8],
    random_bytes: &[u8; 32 + 224],
) -> Result<(Vec<u8>, Step2), Error> {
    let Step1 { nonce } = data;
    let tl::enums::ResPq::Pq(res_pq) =
        <tl::functions::ReqPqMulti as RemoteCall>::Return::from_bytes(response)?;

    check_nonce(&res_pq.nonce, &nonce)?;

    if res_pq.pq.len() != 8 {
        return Err(Error::InvalidPqSize {
            size: res_pq.pq.len(),
        });
    }

    let pq = u64::from_be_bytes(res_pq.pq[..].try_into().unwrap());
    let (p, q) = factorize(pq);

    let new_nonce: [u8; 32] = random_bytes[..32].try_into().unwrap();
    let random_bytes: [u8; 224] = random_bytes[32..].try_into().unwrap();

    // "pq is a representation of a natural number (in binary big endian
    // format)"; using the shortest representation matters, or the server
    // will reply with -404.
    let p_bytes = shortest_be_bytes(p);
    let q_bytes = shortest_be_bytes(q);

    let pq_inner_data = tl::enums::PqInnerData::Data(tl::types::PqInnerData {
        pq: res_pq.pq.clone(),
        p: p_bytes.clone(),
        q: q_bytes.clone(),
        nonce,
        server_nonce: res_pq.server_nonce,
        new_nonce,
    })
    .to_bytes();

    let fingerprint = match res_pq
        .server_public_key_fingerprints
        .iter()
        .copied()
        .find(|&fingerprint| key_for_fingerprint(fingerprint).is_some())
    {
        Some(x) => x,
        None => {
            return Err(Error::UnknownFingerprints {
                fingerprints: res_pq.server_public_key_fingerprints.clone(),
            })
        }
    };

    // Safe to unwrap because the fingerprint was found just above.
    let key = key_for_fingerprint(fingerprint).unwrap();
    let ciphertext = rsa::encrypt_hashed(&pq_inner_data, &key, &random_bytes);

    Ok((
        tl::functions::ReqDhParams {
            nonce,
            server_nonce: res_pq.server_nonce,
            p: p_bytes,
            q: q_bytes,
            public_key_fingerprint: fingerprint,
            encrypted_data: ciphertext,
        }
        .to_bytes(),
        Step2 {
            nonce,
            server_nonce: res_pq.server_nonce,
            new_nonce,
        },
    ))
}

/// The third step of the process to generate an authorization key:
/// decrypt and validate the server's DH parameters, and complete our
/// side of the exchange.
pub fn step3(data: Step2, response: &[u8]) -> Result<(Vec<u8>, Step3), Error> {
    let random_bytes = {
        let mut buffer = [0; 256 + 16];
        getrandom(&mut buffer).expect("failed to generate secure data for auth key");
        buffer
    };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time is before epoch")
        .as_secs() as i32;

    do_step3(data, response, &random_bytes, now)
}

fn do_step3(
    data: Step2,
    response: &[u8],
    random_bytes: &[u8; 256 + 16],
    now: i32,
) -> Result<(Vec<u8>, Step3), Error> {
    let Step2 {
        nonce,
        server_nonce,
        new_nonce,
    } = data;
    let server_dh_params =
        <tl::functions::ReqDhParams as RemoteCall>::Return::from_bytes(response)?;

    let server_dh_params = match server_dh_params {
        tl::enums::ServerDhParams::Fail(server_dh_params) => {
            // Even though this is a failing case, all the security
            // checks must still be performed.
            check_nonce(&server_dh_params.nonce, &nonce)?;
            check_server_nonce(&server_dh_params.server_nonce, &server_nonce)?;

            let new_nonce_hash: [u8; 16] = {
                let mut hasher = Sha1::new();
                hasher.update(new_nonce);
                hasher.finalize()[4..20].try_into().unwrap()
            };
            check_new_nonce_hash(&server_dh_params.new_nonce_hash, &new_nonce_hash)?;

            return Err(Error::DhParamsFail);
        }
        tl::enums::ServerDhParams::Ok(x) => x,
    };

    check_nonce(&server_dh_params.nonce, &nonce)?;
    check_server_nonce(&server_dh_params.server_nonce, &server_nonce)?;

    if server_dh_params.encrypted_answer.len() % 16 != 0 {
        return Err(Error::EncryptedResponseNotPadded {
            len: server_dh_params.encrypted_answer.len(),
        });
    }

    // Complete the DH exchange.
    let (key, iv) = ferrogram_crypto::generate_key_data_from_nonce(&server_nonce, &new_nonce);

    // sha1 hash + plaintext answer + padding
    let plain_text_answer =
        ferrogram_crypto::decrypt_ige(&server_dh_params.encrypted_answer, &key, &iv);

    let got_answer_hash: [u8; 20] = plain_text_answer[..20].try_into().unwrap();

    // An explicit cursor is used so the end of the answer (and thus
    // where the padding starts) is known.
    let mut answer_cursor = Cursor::from_slice(&plain_text_answer[20..]);
    let server_dh_inner = match tl::enums::ServerDhInnerData::deserialize(&mut answer_cursor) {
        Ok(tl::enums::ServerDhInnerData::Data(x)) => x,
        Err(error) => return Err(Error::InvalidDhInnerData { error }),
    };

    let expected_answer_hash: [u8; 20] = {
        let mut hasher = Sha1::new();
        hasher.update(&plain_text_answer[20..20 + answer_cursor.pos()]);
        hasher.finalize().into()
    };

    if got_answer_hash != expected_answer_hash {
        return Err(Error::InvalidAnswerHash {
            got: got_answer_hash,
            expected: expected_answer_hash,
        });
    }

    check_nonce(&server_dh_inner.nonce, &nonce)?;
    check_server_nonce(&server_dh_inner.server_nonce, &server_nonce)?;

    // Safe to unwrap because the numbers are valid.
    let dh_prime = BigUint::from_bytes_be(&server_dh_inner.dh_prime);
    let g = server_dh_inner.g.to_biguint().unwrap();
    let g_a = BigUint::from_bytes_be(&server_dh_inner.g_a);

    let time_offset = server_dh_inner.server_time - now;

    // IMPORTANT: Apart from the conditions on the Diffie-Hellman prime
    // dh_prime and generator g, both sides are to check that g, g_a and
    // g_b are greater than 1 and less than dh_prime - 1, with g_a and
    // g_b also between 2^{2048-64} and dh_prime - 2^{2048-64}.
    let one = BigUint::from(1u8);
    check_g_in_range(&g, &one, &(&dh_prime - &one))?;
    check_g_in_range(&g_a, &one, &(&dh_prime - &one))?;

    let safety_range = &one << (2048 - 64);
    check_g_in_range(&g_a, &safety_range, &(&dh_prime - &safety_range))?;

    let state = DhState {
        nonce,
        server_nonce,
        new_nonce,
        g,
        dh_prime,
        g_a,
        key,
        iv,
        time_offset,
    };

    let (request, gab) = client_dh_request(&state, 0, random_bytes)?;
    Ok((request, Step3 { state, gab }))
}

/// Run our half of the client-DH round: pick the secret `b`, derive
/// `g_b` and the shared key, and produce the `set_client_DH_params`
/// request with the inner data encrypted under the nonce key.
fn client_dh_request(
    state: &DhState,
    retry_id: i64,
    random_bytes: &[u8; 256 + 16],
) -> Result<(Vec<u8>, BigUint), Error> {
    let b = BigUint::from_bytes_be(&random_bytes[..256]);
    let g_b = state.g.modpow(&b, &state.dh_prime);
    let gab = state.g_a.modpow(&b, &state.dh_prime);

    let one = BigUint::from(1u8);
    check_g_in_range(&g_b, &one, &(&state.dh_prime - &one))?;
    let safety_range = &one << (2048 - 64);
    check_g_in_range(&g_b, &safety_range, &(&state.dh_prime - &safety_range))?;

    let client_dh_inner = tl::enums::ClientDhInnerData::Data(tl::types::ClientDhInnerData {
        nonce: state.nonce,
        server_nonce: state.server_nonce,
        retry_id,
        g_b: g_b.to_bytes_be(),
    })
    .to_bytes();

    // sha1(client_dh_inner) + client_dh_inner, deterministically padded
    // so that `encrypt_ige` does not introduce randomness of its own.
    let mut client_dh_inner_hashed = {
        let mut hasher = Sha1::new();
        hasher.update(&client_dh_inner);

        let mut buffer = Vec::with_capacity(20 + client_dh_inner.len() + 16);
        buffer.extend(hasher.finalize());
        buffer.extend(&client_dh_inner);
        buffer
    };
    let pad_len = (16 - (client_dh_inner_hashed.len() % 16)) % 16;
    client_dh_inner_hashed.extend(&random_bytes[256..256 + pad_len]);

    let client_dh_encrypted =
        ferrogram_crypto::encrypt_ige(&client_dh_inner_hashed, &state.key, &state.iv);

    Ok((
        tl::functions::SetClientDhParams {
            nonce: state.nonce,
            server_nonce: state.server_nonce,
            encrypted_data: client_dh_encrypted,
        }
        .to_bytes(),
        gab,
    ))
}

/// The last step of the process to generate an authorization key.
///
/// On a `dh_gen_retry` answer, the exchange is not over: a new
/// client-DH request with a fresh secret is returned instead, carrying
/// the previous key's auxiliary hash as `retry_id`.
pub fn create_key(data: Step3, response: &[u8]) -> Result<CreatedKey, Error> {
    let random_bytes = {
        let mut buffer = [0; 256 + 16];
        getrandom(&mut buffer).expect("failed to generate secure data for auth key");
        buffer
    };

    do_create_key(data, response, &random_bytes)
}

fn do_create_key(
    data: Step3,
    response: &[u8],
    random_bytes: &[u8; 256 + 16],
) -> Result<CreatedKey, Error> {
    let Step3 { state, gab } = data;
    let dh_gen = <tl::functions::SetClientDhParams as RemoteCall>::Return::from_bytes(response)?;

    let auth_key = {
        let mut buffer = [0; 256];
        let gab_bytes = gab.to_bytes_be();
        // gab might need fewer than 256 bytes.
        let skip = buffer.len() - gab_bytes.len();
        buffer[skip..].copy_from_slice(&gab_bytes);
        AuthKey::from_bytes(buffer)
    };

    match dh_gen {
        tl::enums::SetClientDhParamsAnswer::DhGenOk(x) => {
            check_nonce(&x.nonce, &state.nonce)?;
            check_server_nonce(&x.server_nonce, &state.server_nonce)?;
            check_new_nonce_hash(
                &x.new_nonce_hash1,
                &auth_key.calc_new_nonce_hash(&state.new_nonce, 1),
            )?;

            let first_salt = {
                let mut buffer = [0; 8];
                buffer
                    .iter_mut()
                    .zip(&state.new_nonce[..8])
                    .zip(&state.server_nonce[..8])
                    .for_each(|((x, a), b)| *x = a ^ b);
                i64::from_le_bytes(buffer)
            };

            Ok(CreatedKey::Done(Finished {
                auth_key: auth_key.to_bytes(),
                time_offset: state.time_offset,
                first_salt,
            }))
        }
        tl::enums::SetClientDhParamsAnswer::DhGenRetry(x) => {
            check_nonce(&x.nonce, &state.nonce)?;
            check_server_nonce(&x.server_nonce, &state.server_nonce)?;
            check_new_nonce_hash(
                &x.new_nonce_hash2,
                &auth_key.calc_new_nonce_hash(&state.new_nonce, 2),
            )?;

            // The server rejected g_b; run the round again with a fresh
            // secret, telling it which attempt is being retried.
            let retry_id = i64::from_le_bytes(auth_key.aux_hash());
            let (request, gab) = client_dh_request(&state, retry_id, random_bytes)?;
            Ok(CreatedKey::Retry {
                request,
                data: Step3 { state, gab },
            })
        }
        tl::enums::SetClientDhParamsAnswer::DhGenFail(x) => {
            check_nonce(&x.nonce, &state.nonce)?;
            check_server_nonce(&x.server_nonce, &state.server_nonce)?;
            check_new_nonce_hash(
                &x.new_nonce_hash3,
                &auth_key.calc_new_nonce_hash(&state.new_nonce, 3),
            )?;

            Err(Error::DhGenFail)
        }
    }
}

/// The shortest big-endian representation of a number ("with leading
/// zero bytes removed").
fn shortest_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

fn check_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidNonce {
            got: *got,
            expected: *expected,
        })
    }
}

fn check_server_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidServerNonce {
            got: *got,
            expected: *expected,
        })
    }
}

fn check_new_nonce_hash(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidNewNonceHash {
            got: *got,
            expected: *expected,
        })
    }
}

fn check_g_in_range(value: &BigUint, low: &BigUint, high: &BigUint) -> Result<(), Error> {
    if low < value && value < high {
        Ok(())
    } else {
        Err(Error::GParameterOutOfRange {
            value: value.clone(),
            low: low.clone(),
            high: high.clone(),
        })
    }
}

/// Find the RSA key's `(n, e)` pair for a certain fingerprint.
#[allow(clippy::unreadable_literal)]
fn key_for_fingerprint(fingerprint: i64) -> Option<rsa::Key> {
    Some(match fingerprint {
        // Production
        -3414540481677951611 => rsa::Key::new("29379598170669337022986177149456128565388431120058863768162556424047512191330847455146576344487764408661701890505066208632169112269581063774293102577308490531282748465986139880977280302242772832972539403531316010870401287642763009136156734339538042419388722777357134487746169093539093850251243897188928735903389451772730245253062963384108812842079887538976360465290946139638691491496062099570836476454855996319192747663615955633778034897140982517446405334423701359108810182097749467210509584293428076654573384828809574217079944388301239431309115013843331317877374435868468779972014486325557807783825502498215169806323", "65537").unwrap(),
        // Test
        -5595554452916591101 => rsa::Key::new("25342889448840415564971689590713473206898847759084779052582026594546022463853940585885215951168491965708222649399180603818074200620463776135424884632162512403163793083921641631564740959529419359595852941166848940585952337613333022396096584117954892216031229237302943701877588456738335398602461675225081791820393153757504952636234951323237820036543581047826906120927972487366805292115792231423684261262330394324750785450942589751755390156647751460719351439969059949569615302809050721500330239005077889855323917509948255722081644689442127297605422579707142646660768825302832201908302295573257427896031830742328565032949", "65537").unwrap(),

        _ => return None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrogram_crypto::{encrypt_ige, generate_key_data_from_nonce};

    const PROD_FINGERPRINT: i64 = -3414540481677951611;

    // A 2048-bit odd modulus; the exchange only performs range checks on
    // it, so the fixture does not need to be a real safe prime.
    fn test_dh_prime() -> Vec<u8> {
        let mut bytes = vec![0xab; 256];
        bytes[0] = 0xc7;
        bytes[255] = 0x3b;
        bytes
    }

    fn server_secret() -> BigUint {
        BigUint::from_bytes_be(&[0x5e; 255])
    }

    fn step2_random() -> [u8; 256] {
        let mut random = [0x24; 256];
        random[..32]
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as u8);
        random
    }

    /// Drive the full exchange against a synthetic server that knows its
    /// own DH secret, returning both sides' view of the auth key.
    fn run_exchange(
        answer_for: impl Fn(&BigUint, &AuthKey, &[u8; 32]) -> tl::enums::SetClientDhParamsAnswer,
    ) -> (Result<CreatedKey, Error>, AuthKey) {
        let nonce = [1u8; 16];
        let server_nonce = [2u8; 16];

        // Client step 1.
        let (request, data) = do_step1(&nonce).unwrap();
        assert_eq!(&request[..4], &0xbe7e8ef1u32.to_le_bytes());

        // Server answers with pq and a known fingerprint.
        let res_pq = tl::enums::ResPq::Pq(tl::types::ResPq {
            nonce,
            server_nonce,
            pq: 1470626929934143021u64.to_be_bytes().to_vec(),
            server_public_key_fingerprints: vec![PROD_FINGERPRINT],
        })
        .to_bytes();

        // Client step 2 factorizes and commits to a new nonce.
        let (request, data) = do_step2(data, &res_pq, &step2_random()).unwrap();
        assert_eq!(&request[..4], &0xd712e4beu32.to_le_bytes());
        let new_nonce: [u8; 32] = step2_random()[..32].try_into().unwrap();

        // Server prepares its DH parameters.
        let dh_prime_bytes = test_dh_prime();
        let dh_prime = BigUint::from_bytes_be(&dh_prime_bytes);
        let g = BigUint::from(3u8);
        let a = server_secret();
        let g_a = g.modpow(&a, &dh_prime);

        let server_dh_inner = tl::enums::ServerDhInnerData::Data(tl::types::ServerDhInnerData {
            nonce,
            server_nonce,
            g: 3,
            dh_prime: dh_prime_bytes,
            g_a: g_a.to_bytes_be(),
            server_time: 1700000000,
        })
        .to_bytes();

        let (key, iv) = generate_key_data_from_nonce(&server_nonce, &new_nonce);
        let mut answer = Vec::with_capacity(20 + server_dh_inner.len());
        answer.extend(sha1::Sha1::digest(&server_dh_inner));
        answer.extend(&server_dh_inner);
        answer.extend(std::iter::repeat(0).take((16 - answer.len() % 16) % 16));
        let encrypted_answer = encrypt_ige(&answer, &key, &iv);

        let server_dh_params = tl::enums::ServerDhParams::Ok(tl::types::ServerDhParamsOk {
            nonce,
            server_nonce,
            encrypted_answer,
        })
        .to_bytes();

        // Client step 3 computes g_b and the shared key.
        let (request, data) = do_step3(data, &server_dh_params, &[0x91; 272], 1700000000).unwrap();
        assert_eq!(&request[..4], &0xf5045f1fu32.to_le_bytes());

        // The server decrypts g_b and derives the same shared key.
        let mut cursor = Cursor::from_slice(&request[4..]);
        let _nonce = <[u8; 16]>::deserialize(&mut cursor).unwrap();
        let _server_nonce = <[u8; 16]>::deserialize(&mut cursor).unwrap();
        let encrypted_data = Vec::<u8>::deserialize(&mut cursor).unwrap();

        let decrypted = ferrogram_crypto::decrypt_ige(&encrypted_data, &key, &iv);
        let mut inner_cursor = Cursor::from_slice(&decrypted[20..]);
        let tl::enums::ClientDhInnerData::Data(client_inner) =
            tl::enums::ClientDhInnerData::deserialize(&mut inner_cursor).unwrap();

        let g_b = BigUint::from_bytes_be(&client_inner.g_b);
        let gab = g_b.modpow(&a, &dh_prime);
        let server_auth_key = {
            let mut buffer = [0; 256];
            let bytes = gab.to_bytes_be();
            buffer[256 - bytes.len()..].copy_from_slice(&bytes);
            AuthKey::from_bytes(buffer)
        };

        let response = answer_for(&gab, &server_auth_key, &new_nonce).to_bytes();
        (do_create_key(data, &response, &[0x77; 272]), server_auth_key)
    }

    #[test]
    fn both_sides_agree_on_the_key() {
        let (result, server_auth_key) = run_exchange(|_, key, new_nonce| {
            tl::enums::SetClientDhParamsAnswer::DhGenOk(tl::types::DhGenOk {
                nonce: [1; 16],
                server_nonce: [2; 16],
                new_nonce_hash1: key.calc_new_nonce_hash(new_nonce, 1),
            })
        });

        match result.unwrap() {
            CreatedKey::Done(finished) => {
                assert_eq!(finished.auth_key, server_auth_key.to_bytes());
                assert_eq!(finished.time_offset, 0);

                // first_salt = new_nonce[..8] ^ server_nonce[..8]
                let expected = i64::from_le_bytes(
                    (0..8)
                        .map(|i| (i as u8) ^ 2)
                        .collect::<Vec<_>>()
                        .try_into()
                        .unwrap(),
                );
                assert_eq!(finished.first_salt, expected);
            }
            CreatedKey::Retry { .. } => panic!("exchange should have completed"),
        }
    }

    #[test]
    fn retry_answer_restarts_client_round() {
        let (result, first_key) = run_exchange(|_, key, new_nonce| {
            tl::enums::SetClientDhParamsAnswer::DhGenRetry(tl::types::DhGenRetry {
                nonce: [1; 16],
                server_nonce: [2; 16],
                new_nonce_hash2: key.calc_new_nonce_hash(new_nonce, 2),
            })
        });

        match result.unwrap() {
            CreatedKey::Retry { request, data } => {
                assert_eq!(&request[..4], &0xf5045f1fu32.to_le_bytes());

                // The retried round must carry a fresh shared key and
                // identify the attempt it replaces.
                let retried = {
                    let mut buffer = [0; 256];
                    let bytes = data.gab.to_bytes_be();
                    buffer[256 - bytes.len()..].copy_from_slice(&bytes);
                    AuthKey::from_bytes(buffer)
                };
                assert_ne!(retried.to_bytes(), first_key.to_bytes());

                let mut cursor = Cursor::from_slice(&request[4..]);
                let _ = <[u8; 16]>::deserialize(&mut cursor).unwrap();
                let _ = <[u8; 16]>::deserialize(&mut cursor).unwrap();
                let encrypted_data = Vec::<u8>::deserialize(&mut cursor).unwrap();
                let (key, iv) = generate_key_data_from_nonce(
                    &[2; 16],
                    &step2_random()[..32].try_into().unwrap(),
                );
                let decrypted = ferrogram_crypto::decrypt_ige(&encrypted_data, &key, &iv);
                let mut inner = Cursor::from_slice(&decrypted[20..]);
                let tl::enums::ClientDhInnerData::Data(inner) =
                    tl::enums::ClientDhInnerData::deserialize(&mut inner).unwrap();
                assert_eq!(
                    inner.retry_id,
                    i64::from_le_bytes(first_key.aux_hash())
                );
            }
            CreatedKey::Done(_) => panic!("exchange should have been retried"),
        }
    }

    #[test]
    fn failed_answer_is_terminal() {
        let (result, _) = run_exchange(|_, key, new_nonce| {
            tl::enums::SetClientDhParamsAnswer::DhGenFail(tl::types::DhGenFail {
                nonce: [1; 16],
                server_nonce: [2; 16],
                new_nonce_hash3: key.calc_new_nonce_hash(new_nonce, 3),
            })
        });

        assert_eq!(result.unwrap_err(), Error::DhGenFail);
    }

    #[test]
    fn forged_nonce_hash_is_rejected() {
        let (result, _) = run_exchange(|_, _, _| {
            tl::enums::SetClientDhParamsAnswer::DhGenOk(tl::types::DhGenOk {
                nonce: [1; 16],
                server_nonce: [2; 16],
                new_nonce_hash1: [0; 16],
            })
        });

        assert!(matches!(result, Err(Error::InvalidNewNonceHash { .. })));
    }

    #[test]
    fn mismatched_nonce_is_rejected() {
        let (request, data) = do_step1(&[7; 16]).unwrap();
        assert!(!request.is_empty());

        let res_pq = tl::enums::ResPq::Pq(tl::types::ResPq {
            nonce: [8; 16], // does not match ours
            server_nonce: [2; 16],
            pq: 1470626929934143021u64.to_be_bytes().to_vec(),
            server_public_key_fingerprints: vec![PROD_FINGERPRINT],
        })
        .to_bytes();

        assert!(matches!(
            do_step2(data, &res_pq, &[0; 256]),
            Err(Error::InvalidNonce { .. })
        ));
    }

    #[test]
    fn unknown_fingerprints_are_rejected() {
        let (_, data) = do_step1(&[7; 16]).unwrap();

        let res_pq = tl::enums::ResPq::Pq(tl::types::ResPq {
            nonce: [7; 16],
            server_nonce: [2; 16],
            pq: 1470626929934143021u64.to_be_bytes().to_vec(),
            server_public_key_fingerprints: vec![1234],
        })
        .to_bytes();

        assert!(matches!(
            do_step2(data, &res_pq, &[0; 256]),
            Err(Error::UnknownFingerprints { .. })
        ));
    }

    #[test]
    fn shortest_bytes_drop_leading_zeros() {
        assert_eq!(shortest_be_bytes(0x0102), vec![1, 2]);
        assert_eq!(shortest_be_bytes(0), vec![0]);
        assert_eq!(shortest_be_bytes(0x47e8a6a3), vec![0x47, 0xe8, 0xa6, 0xa3]);
    }
}
