//! Certificate issuance service.
//!
//! # Invariants
//! - Certificates are issued only to registered residents.
//! - Revocation is final.

use super::{RecordResult, RecordServiceError};
use crate::model::certificate::{Certificate, CertificateId, CertificateStatus};
use crate::model::resident::ResidentId;
use crate::repo::certificate_repo::{
    CertificateListQuery, CertificateRepository, CertificateSummary,
};
use crate::repo::resident_repo::ResidentRepository;
use log::info;

pub struct CertificateService<C: CertificateRepository, R: ResidentRepository> {
    certificates: C,
    residents: R,
}

impl<C: CertificateRepository, R: ResidentRepository> CertificateService<C, R> {
    pub fn new(certificates: C, residents: R) -> Self {
        Self {
            certificates,
            residents,
        }
    }

    /// Issues `certificate` with a freshly allocated number.
    pub fn issue_certificate(&self, certificate: &Certificate) -> RecordResult<Certificate> {
        self.ensure_resident(certificate.resident_id)?;

        let mut certificate = certificate.clone();
        certificate.status = CertificateStatus::Active;
        certificate.normalize()?;
        let issued = self.certificates.issue_certificate(&certificate)?;
        info!(
            "event=certificate_issue module=service status=ok certificate_id={} number={}",
            issued.id, issued.certificate_number
        );
        Ok(issued)
    }

    pub fn revoke_certificate(&self, id: CertificateId) -> RecordResult<Certificate> {
        let certificate = self.fetch(id)?;
        if certificate.status != CertificateStatus::Revoked {
            self.certificates
                .set_certificate_status(id, CertificateStatus::Revoked)?;
            info!("event=certificate_revoke module=service status=ok certificate_id={id}");
        }
        self.fetch(id)
    }

    /// Persists `expired` on an active certificate. Revoked ones are refused.
    pub fn mark_expired(&self, id: CertificateId) -> RecordResult<Certificate> {
        let certificate = self.fetch(id)?;
        if certificate.status == CertificateStatus::Revoked {
            return Err(RecordServiceError::InvalidTransition {
                table: "certificates",
                from: certificate.status.as_str(),
                to: CertificateStatus::Expired.as_str(),
            });
        }
        self.certificates
            .set_certificate_status(id, CertificateStatus::Expired)?;
        self.fetch(id)
    }

    pub fn get_certificate(&self, id: CertificateId) -> RecordResult<Option<Certificate>> {
        Ok(self.certificates.get_certificate(id)?)
    }

    pub fn list_certificates(
        &self,
        query: &CertificateListQuery,
    ) -> RecordResult<Vec<CertificateSummary>> {
        Ok(self.certificates.list_certificates(query)?)
    }

    /// Certificates issued to one resident, newest first.
    pub fn resident_certificates(
        &self,
        resident_id: ResidentId,
    ) -> RecordResult<Vec<CertificateSummary>> {
        self.ensure_resident(resident_id)?;
        self.list_certificates(&CertificateListQuery {
            resident_id: Some(resident_id),
            ..CertificateListQuery::default()
        })
    }

    fn ensure_resident(&self, resident_id: ResidentId) -> RecordResult<()> {
        match self.residents.get_resident(resident_id)? {
            Some(_) => Ok(()),
            None => Err(RecordServiceError::NotFound {
                table: "residents",
                id: resident_id,
            }),
        }
    }

    fn fetch(&self, id: CertificateId) -> RecordResult<Certificate> {
        self.certificates
            .get_certificate(id)?
            .ok_or(RecordServiceError::NotFound {
                table: "certificates",
                id,
            })
    }
}
