//! Licence e-mail delivery via SMTP.
//!
//! [`LicenceMailer`] wraps the `lettre` async SMTP transport. Configuration
//! is read from environment variables; when the relay is not fully
//! configured [`EmailConfig::from_env`] returns `Ok(None)` and the mailer falls
//! back to logging the licence so an operator can forward it by hand.

use licensing_core::licence::{api_key_marker, licence_marker};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// `SMTP_PORT` is set but is not a port number.
    #[error("Invalid SMTP_PORT {0:?}")]
    InvalidPort(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Configuration for the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    /// RFC 5322 "From" address.
    pub from_address: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default       |
    /// |-----------------|----------|---------------|
    /// | `SMTP_HOST`     | yes      |               |
    /// | `SMTP_PORT`     | no       | `587`         |
    /// | `SMTP_USER`     | yes      |               |
    /// | `SMTP_PASSWORD` | yes      |               |
    /// | `FROM_EMAIL`    | no       | `SMTP_USER`   |
    pub fn from_env() -> Result<Option<Self>, EmailError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset. Returns `Ok(None)` unless host, user
    /// and password are all present, and an error when `SMTP_PORT` does not
    /// parse.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, EmailError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| EmailError::InvalidPort(raw.clone()))?,
            None => DEFAULT_SMTP_PORT,
        };

        let (Some(smtp_host), Some(smtp_user), Some(smtp_password)) =
            (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASSWORD"))
        else {
            return Ok(None);
        };
        let from_address = get("FROM_EMAIL").unwrap_or_else(|| smtp_user.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            from_address,
        }))
    }
}

// ---------------------------------------------------------------------------
// LicenceEmail
// ---------------------------------------------------------------------------

/// The message sent to a buyer once their licence is issued.
#[derive(Debug, Clone)]
pub struct LicenceEmail {
    pub to: String,
    pub code: String,
    /// MeuDanfe API key shared by all customers.
    pub api_key: String,
    pub licence_days: u32,
}

impl LicenceEmail {
    pub fn subject(&self) -> &'static str {
        "Sua licença da extensão de NF"
    }

    pub fn body(&self) -> String {
        let licence = licence_marker(&self.code);
        let api_key = api_key_marker(&self.api_key);
        let days = self.licence_days;
        format!(
            "Olá!\n\
             \n\
             Obrigado pela sua compra.\n\
             \n\
             Aqui estão seus dados de acesso:\n\
             \n\
             Chave da extensão (licença):\n\
             \x20 {licence}\n\
             \n\
             Api-Key do MeuDanfe (não compartilhe):\n\
             \x20 {api_key}\n\
             \n\
             Como usar:\n\
             1. Instale a extensão no Chrome.\n\
             2. Abra o popup da extensão.\n\
             3. Em uma anotação, digite a linha com a licença:\n\
             \x20  {licence}\n\
             4. A extensão irá validar sua licença automaticamente.\n\
             5. A Api-Key do MeuDanfe será usada pelo sistema para baixar suas notas.\n\
             \n\
             Validade da licença: {days} dias a partir da data da compra.\n\
             \n\
             Qualquer dúvida, responda este e-mail.\n\
             \n\
             Abraço!\n"
        )
    }
}

// ---------------------------------------------------------------------------
// LicenceMailer
// ---------------------------------------------------------------------------

/// How a licence e-mail left the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the SMTP relay.
    Sent,
    /// No relay configured; the licence was written to the log instead.
    Logged,
}

impl Delivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Sent => "sent",
            Delivery::Logged => "logged",
        }
    }
}

/// Sends licence e-mails, or logs them when SMTP is not configured.
pub struct LicenceMailer {
    config: Option<EmailConfig>,
}

impl LicenceMailer {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn send(&self, email: &LicenceEmail) -> Result<Delivery, EmailError> {
        let Some(config) = &self.config else {
            tracing::info!(
                to = %email.to,
                licence = %licence_marker(&email.code),
                "SMTP not configured, licence e-mail not sent",
            );
            return Ok(Delivery::Logged);
        };

        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let message = Message::builder()
            .from(config.from_address.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        mailer.send(message).await?;

        tracing::info!(to = %email.to, code = %email.code, "Licence e-mail sent");
        Ok(Delivery::Sent)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
