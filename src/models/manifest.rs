//! Modele du manifeste MDF-e tel qu'il est extrait du XML
//!
//! Les champs texte restent tels quels (chaine vide quand la balise est
//! absente); la mise en forme est faite au moment du dessin.

/// Forme d'emission (`ide/tpEmis`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionType {
    Normal,
    Contingency,
}

impl EmissionType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(EmissionType::Normal),
            "2" => Some(EmissionType::Contingency),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmissionType::Normal => "Normal",
            EmissionType::Contingency => "Contingência",
        }
    }
}

/// Type d'emetteur (`ide/tpEmit`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterType {
    TransportProvider,
    OwnCargoCarrier,
    GlobalizedCteProvider,
}

impl EmitterType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(EmitterType::TransportProvider),
            "2" => Some(EmitterType::OwnCargoCarrier),
            "3" => Some(EmitterType::GlobalizedCteProvider),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmitterType::TransportProvider => "Prestador de serviço de transporte",
            EmitterType::OwnCargoCarrier => "Transportador de Carga Própria",
            EmitterType::GlobalizedCteProvider => {
                "Prestador de serviço de transporte que emitirá CT-e Globalizado"
            }
        }
    }
}

/// Environnement d'emission (`ide/tpAmb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Homologation,
}

impl Environment {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Environment::Production),
            "2" => Some(Environment::Homologation),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Environment::Production => "Produção",
            Environment::Homologation => "Homologação",
        }
    }
}

/// Date et heure deja converties en UTC et formatees (dd/mm/YYYY, HH:MM:SS)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeText {
    pub date: String,
    pub time: String,
}

impl DateTimeText {
    /// "date heure", ou chaine vide si la date est absente
    pub fn joined(&self) -> String {
        if self.date.is_empty() {
            String::new()
        } else {
            format!("{} {}", self.date, self.time)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identification {
    pub model: String,
    pub series: String,
    pub number: String,
    pub issued_at: DateTimeText,
    pub loading_uf: String,
    pub unloading_uf: String,
    pub emission_type: EmissionType,
    pub trip_start: DateTimeText,
    pub emitter_type: EmitterType,
    pub environment: Environment,
    /// UF de parcours, dans l'ordre du document
    pub route: Vec<String>,
    pub later_loading: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Emitter {
    pub name: String,
    pub street: String,
    pub number: String,
    pub district: String,
    pub cep: String,
    pub city: String,
    pub uf: String,
    /// CNPJ, ou CPF pour un emetteur personne physique
    pub document: String,
    pub ie: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vehicle {
    pub plate: String,
    pub uf: String,
    pub rntrc: String,
    pub renavam: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Driver {
    pub cpf: String,
    pub name: String,
}

/// Vale-pedagio (`valePed/disp`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TollVoucher {
    pub supplier_cnpj: String,
    pub payer_document: String,
    pub voucher_number: String,
    pub value: Option<f64>,
}

/// Modal rodoviario (`infModal/rodo`)
#[derive(Debug, Clone, Default)]
pub struct RoadModal {
    pub rntrc: String,
    /// Vehicule tracteur en premier, puis les remorques
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub tolls: Vec<TollVoucher>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub cte_count: String,
    pub nfe_count: String,
    pub cargo_value: Option<f64>,
    pub cargo_weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cte,
    Nfe,
    Mdfe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedDocument {
    pub kind: DocumentKind,
    pub key: String,
}

/// Municipio de descarga et documents fiscaux vinculados
#[derive(Debug, Clone, Default)]
pub struct UnloadingCity {
    pub name: String,
    pub documents: Vec<LinkedDocument>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insurance {
    pub insurer_name: String,
    pub insurer_cnpj: String,
    pub policy: String,
    pub endorsements: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Additional {
    pub fisco: String,
    pub taxpayer: String,
}

/// Protocole d'autorisation (`protMDFe`)
#[derive(Debug, Clone, Default)]
pub struct Protocol {
    pub number: String,
    pub received_at: DateTimeText,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    /// Chave de acesso (44 chiffres, sans le prefixe `MDFe`)
    pub access_key: String,
    pub identification: Identification,
    pub emitter: Emitter,
    pub road: RoadModal,
    pub totals: Totals,
    pub unloading: Vec<UnloadingCity>,
    pub insurances: Vec<Insurance>,
    pub additional: Additional,
    pub qr_code: String,
    pub protocol: Option<Protocol>,
}

impl Manifest {
    /// Le DAMDFE n'a de valeur fiscale qu'en production et avec protocole
    pub fn has_fiscal_value(&self) -> bool {
        self.identification.environment == Environment::Production && self.protocol.is_some()
    }

    /// Documents vinculados a plat, chacun avec son municipio de descarga
    pub fn linked_documents(&self) -> Vec<(&str, &LinkedDocument)> {
        self.unloading
            .iter()
            .flat_map(|city| city.documents.iter().map(move |doc| (city.name.as_str(), doc)))
            .collect()
    }
}
