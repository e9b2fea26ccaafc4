//! Proof creation and verification across the cryptosuite registry.

use di_vectors::{
    Algorithm, Canonicalization, Error, HashAlgorithm, ProofPipeline, ProofTemplate, StaticLoader,
    cryptosuite, multikey,
};
use serde_json::{Value, json};
use test_utils::{CREATED, P256_MULTIKEY};

const TRANSFORMED: &str = "_:c14n0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
    <https://www.w3.org/2018/credentials#VerifiableCredential> .\n";

const COMBINED_HASH: &str = "3a8a522f689025727fb9d1f0fa99a618da023e8494ac74f51015d009d35abc2e\
    7b26d5c58b7b43d39e1a82b8fe868f1c46353122fd6d740004d09923a4bb7028";

const PROOF_VALUE: &str =
    "z3x6BTUegWJTCyWCSTfBfvBGpuGn6P8PQRDG9DmUkUKQDRnY9uDy88Z9Eci1ZQGr6fEQda2VYuzCdmG3qXU3TPr2a";

// Canonical proof configuration of the fixed `ecdsa-rdfc-2019` vector.
fn proof_config() -> String {
    let vm = format!("did:key:{P256_MULTIKEY}#{P256_MULTIKEY}");
    [
        "_:c14n0 <http://purl.org/dc/terms/created> \
         \"2023-02-24T23:36:38Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime> .\n"
            .to_string(),
        "_:c14n0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
         <https://w3id.org/security#DataIntegrityProof> .\n"
            .to_string(),
        "_:c14n0 <https://w3id.org/security#cryptosuite> \
         \"ecdsa-rdfc-2019\"^^<https://w3id.org/security#cryptosuiteString> .\n"
            .to_string(),
        "_:c14n0 <https://w3id.org/security#proofPurpose> \
         <https://w3id.org/security#assertionMethod> .\n"
            .to_string(),
        format!("_:c14n0 <https://w3id.org/security#verificationMethod> <{vm}> .\n"),
    ]
    .concat()
}

fn template() -> ProofTemplate {
    serde_json::from_value(test_utils::proof_template()).expect("valid template")
}

// Flip one bit of the decoded proof value and re-encode it.
fn tamper_proof_value(signed: &mut Value, algorithm: Algorithm) {
    let encoded = signed["proof"]["proofValue"].as_str().expect("proof value");
    let mut signature = multikey::decode_bytes(encoded, algorithm.encoding()).expect("decodes");
    signature[0] ^= 0x01;
    signed["proof"]["proofValue"] = json!(multikey::encode_bytes(&signature, algorithm.encoding()));
}

#[tokio::test]
async fn round_trip_every_suite() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::alumni_credential();

    for suite in cryptosuite::all() {
        let key_pair = test_utils::key_pair(suite.algorithm()).expect("key pair");
        let signed = pipeline
            .create(&document, &template(), &key_pair, suite.id())
            .await
            .unwrap_or_else(|e| panic!("{suite}: {e}"));

        let proof = &signed["proof"];
        assert_eq!(proof["type"], "DataIntegrityProof");
        assert_eq!(proof["cryptosuite"], suite.id());
        assert_eq!(proof["created"], CREATED);
        assert_eq!(proof["proofPurpose"], "assertionMethod");
        assert!(proof.get("@context").is_none(), "{suite}: proof carries no context");

        let multibase = key_pair.public_key_multibase();
        assert_eq!(proof["verificationMethod"], format!("did:key:{multibase}#{multibase}"));

        let proof_value = proof["proofValue"].as_str().expect("proof value");
        let expected = if suite.algorithm() == Algorithm::EcdsaP256 { 'z' } else { 'u' };
        assert!(proof_value.starts_with(expected), "{suite}: {proof_value}");

        // the rest of the document is untouched
        let mut unsigned = signed.clone();
        unsigned.as_object_mut().expect("object").remove("proof");
        assert_eq!(unsigned, document);

        let verified = pipeline.verify(&signed, suite.id()).await.expect("should verify");
        assert!(verified, "{suite}: round trip");
    }
}

#[tokio::test]
async fn fixed_ecdsa_vector() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::unsigned_credential();
    let key_pair = test_utils::p256_key_pair().expect("fixed key");
    assert_eq!(key_pair.public_key_multibase(), P256_MULTIKEY);

    let first = pipeline
        .create_with_digest(&document, &template(), &key_pair, "ecdsa-rdfc-2019")
        .await
        .expect("should create");
    let second = pipeline
        .create_with_digest(&document, &template(), &key_pair, "ecdsa-rdfc-2019")
        .await
        .expect("should create");

    assert_eq!(first.digested, second.digested);
    // RFC 6979 nonces make the whole signed document reproducible
    assert_eq!(first.document, second.document);

    assert_eq!(first.digested.transformed, TRANSFORMED);
    assert_eq!(first.digested.proof_config, proof_config());
    assert_eq!(hex::encode(&first.digested.combined_hash), COMBINED_HASH);
    assert_eq!(first.document["proof"]["proofValue"], PROOF_VALUE);

    assert_eq!(
        first.options.context,
        Some(json!(["https://www.w3.org/ns/credentials/v2"])),
        "proof options carry the document context"
    );

    let verified = pipeline.verify(&first.document, "ecdsa-rdfc-2019").await.expect("verifies");
    assert!(verified);
}

#[tokio::test]
async fn digest_shape_per_suite() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::alumni_credential();

    for id in ["ecdsa-jcs-2019", "mldsa65-jcs-2024", "slhdsa256-jcs-2024"] {
        let suite = cryptosuite::lookup(id).expect("registered");
        assert_eq!(suite.canonicalization(), Canonicalization::Jcs);

        let key_pair = test_utils::key_pair(suite.algorithm()).expect("key pair");
        let signed = pipeline
            .create_with_digest(&document, &template(), &key_pair, id)
            .await
            .expect("should create");

        let expected_len = 32 + suite.hash().output_len();
        assert_eq!(signed.digested.combined_hash.len(), expected_len, "{id}");

        // proof hash is SHA-256 whatever the document hash
        let proof_hash = HashAlgorithm::Sha256.digest(signed.digested.proof_config.as_bytes());
        assert_eq!(&signed.digested.combined_hash[..32], proof_hash.as_slice());

        // JCS output is sorted and carries the document context first
        assert!(signed.digested.proof_config.starts_with(r#"{"@context":["#));
        assert!(signed.digested.proof_config.contains(&format!(r#""cryptosuite":"{id}""#)));
    }
}

#[tokio::test]
async fn tamper_detection() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::alumni_credential();

    for id in ["ecdsa-jcs-2019", "ecdsa-rdfc-2019", "mldsa44-rdfc-2024", "slhdsa128-jcs-2024"] {
        let suite = cryptosuite::lookup(id).expect("registered");
        let key_pair = test_utils::key_pair(suite.algorithm()).expect("key pair");
        let signed =
            pipeline.create(&document, &template(), &key_pair, id).await.expect("should create");

        let mut tampered = signed.clone();
        tamper_proof_value(&mut tampered, suite.algorithm());
        assert!(!pipeline.verify(&tampered, id).await.expect("well formed"), "{id}: proof value");

        let mut tampered = signed.clone();
        tampered["issuer"] = json!("https://vc.example/issuers/5679");
        assert!(!pipeline.verify(&tampered, id).await.expect("well formed"), "{id}: document");

        let mut tampered = signed.clone();
        tampered["proof"]["created"] = json!("2023-02-24T23:36:39Z");
        assert!(!pipeline.verify(&tampered, id).await.expect("well formed"), "{id}: proof");

        let mut tampered = signed.clone();
        tampered["@context"] = json!(["https://www.w3.org/ns/credentials/v2"]);
        assert!(!pipeline.verify(&tampered, id).await.expect("well formed"), "{id}: context");
    }
}

#[tokio::test]
async fn malformed_proof_value_is_unverified() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::unsigned_credential();
    let key_pair = test_utils::key_pair(Algorithm::MlDsa44).expect("key pair");

    let signed = pipeline
        .create(&document, &template(), &key_pair, "mldsa44-jcs-2024")
        .await
        .expect("should create");

    // truncated signature
    let encoded = signed["proof"]["proofValue"].as_str().expect("proof value");
    let signature =
        multikey::decode_bytes(encoded, Algorithm::MlDsa44.encoding()).expect("decodes");
    let mut truncated = signed.clone();
    truncated["proof"]["proofValue"] =
        json!(multikey::encode_bytes(&signature[..100], Algorithm::MlDsa44.encoding()));
    assert!(!pipeline.verify(&truncated, "mldsa44-jcs-2024").await.expect("normalized to false"));

    // wrong multibase alphabet
    let mut wrong_base = signed.clone();
    wrong_base["proof"]["proofValue"] =
        json!(multikey::encode_bytes(&signature, Algorithm::EcdsaP256.encoding()));
    assert!(!pipeline.verify(&wrong_base, "mldsa44-jcs-2024").await.expect("normalized to false"));

    // not multibase at all
    let mut garbage = signed;
    garbage["proof"]["proofValue"] = json!("!!");
    assert!(!pipeline.verify(&garbage, "mldsa44-jcs-2024").await.expect("normalized to false"));
}

#[tokio::test]
async fn cross_suite_rejection() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let document = test_utils::alumni_credential();

    let pairs = [
        ("ecdsa-rdfc-2019", "ecdsa-jcs-2019"),
        ("mldsa44-rdfc-2024", "mldsa44-jcs-2024"),
        ("mldsa44-jcs-2024", "mldsa65-jcs-2024"),
        ("mldsa65-rdfc-2024", "slhdsa192-rdfc-2024"),
        ("slhdsa128-jcs-2024", "ecdsa-jcs-2019"),
    ];

    for (signed_with, checked_with) in pairs {
        let suite = cryptosuite::lookup(signed_with).expect("registered");
        let key_pair = test_utils::key_pair(suite.algorithm()).expect("key pair");
        let signed = pipeline
            .create(&document, &template(), &key_pair, signed_with)
            .await
            .expect("should create");

        match pipeline.verify(&signed, checked_with).await {
            Ok(verified) => assert!(!verified, "{signed_with} accepted as {checked_with}"),
            Err(Error::KeyDecode(_)) => {}
            Err(e) => panic!("{signed_with} as {checked_with}: unexpected error {e}"),
        }
    }
}

#[tokio::test]
async fn signer_must_match_suite() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let key_pair = test_utils::p256_key_pair().expect("fixed key");

    let err = pipeline
        .create(&test_utils::unsigned_credential(), &template(), &key_pair, "mldsa44-rdfc-2024")
        .await
        .expect_err("P-256 key cannot sign ML-DSA suite");
    assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
}

#[tokio::test]
async fn invalid_inputs() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let key_pair = test_utils::p256_key_pair().expect("fixed key");
    let document = test_utils::unsigned_credential();

    let err = pipeline.create(&document, &template(), &key_pair, "ecdsa-2019").await;
    assert!(matches!(err, Err(Error::UnsupportedAlgorithm(_))));

    let not_object = json!(["not", "an", "object"]);
    let err = pipeline.create(&not_object, &template(), &key_pair, "ecdsa-jcs-2019").await;
    assert!(matches!(err, Err(Error::InvalidDocument(_))));

    let bad_created = ProofTemplate::new("assertionMethod").created("yesterday");
    let err = pipeline.create(&document, &bad_created, &key_pair, "ecdsa-jcs-2019").await;
    assert!(matches!(err, Err(Error::InvalidProof(_))));

    let err = pipeline.verify(&document, "ecdsa-jcs-2019").await;
    assert!(matches!(err, Err(Error::InvalidProof(_))), "no proof");

    let signed = pipeline
        .create(&document, &template(), &key_pair, "ecdsa-jcs-2019")
        .await
        .expect("should create");

    let mut missing = signed.clone();
    missing["proof"].as_object_mut().expect("object").remove("proofValue");
    let err = pipeline.verify(&missing, "ecdsa-jcs-2019").await;
    assert!(matches!(err, Err(Error::InvalidProof(_))), "missing proof value");

    let mut bad_key = signed;
    bad_key["proof"]["verificationMethod"] = json!("did:key:z0OIl#z0OIl");
    let err = pipeline.verify(&bad_key, "ecdsa-jcs-2019").await;
    assert!(matches!(err, Err(Error::KeyDecode(_))), "undecodable key");
}

#[tokio::test]
async fn created_defaults_to_now() {
    let loader = StaticLoader::default();
    let pipeline = ProofPipeline::new(&loader);
    let key_pair = test_utils::p256_key_pair().expect("fixed key");

    let signed = pipeline
        .create(
            &test_utils::unsigned_credential(),
            &ProofTemplate::new("assertionMethod"),
            &key_pair,
            "ecdsa-jcs-2019",
        )
        .await
        .expect("should create");

    let created = signed["proof"]["created"].as_str().expect("created");
    chrono::DateTime::parse_from_rfc3339(created).expect("RFC 3339");
    assert!(pipeline.verify(&signed, "ecdsa-jcs-2019").await.expect("verifies"));
}

#[tokio::test]
async fn concurrent_invocations() {
    let loader = StaticLoader::default();
    let document = test_utils::alumni_credential();
    let key_pair = test_utils::p256_key_pair().expect("fixed key");

    let (first, second) = (ProofPipeline::new(&loader), ProofPipeline::new(&loader));
    let template = template();
    let (rdfc, jcs) = tokio::join!(
        first.create(&document, &template, &key_pair, "ecdsa-rdfc-2019"),
        second.create(&document, &template, &key_pair, "ecdsa-jcs-2019"),
    );
    let rdfc = rdfc.expect("should create");
    let jcs = jcs.expect("should create");
    assert_ne!(rdfc["proof"]["proofValue"], jcs["proof"]["proofValue"]);

    let pipeline = ProofPipeline::new(&loader);
    assert!(pipeline.verify(&rdfc, "ecdsa-rdfc-2019").await.expect("verifies"));
    assert!(pipeline.verify(&jcs, "ecdsa-jcs-2019").await.expect("verifies"));
}
