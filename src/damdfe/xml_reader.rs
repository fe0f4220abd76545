//! Lecture du XML MDF-e (schema 3.00) vers le modele `Manifest`
//!
//! Les elements sont recherches par nom local dans l'espace de noms MDF-e.
//! Une balise absente donne une chaine vide; seuls `infMDFe/@Id` et les
//! codes tabules (`tpEmis`, `tpEmit`, `tpAmb`) sont obligatoires.

use roxmltree::{Document, Node};

use super::format::{parse_decimal, split_datetime_utc};
use crate::models::error::DamdfeError;
use crate::models::manifest::{
    Additional, DocumentKind, Emitter, EmissionType, EmitterType, Environment, Identification,
    Insurance, LinkedDocument, Manifest, Protocol, RoadModal, TollVoucher, Totals, UnloadingCity,
    Vehicle, Driver,
};

/// Espace de noms des documents MDF-e
pub const MDFE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/mdfe";

fn is_tag(node: &Node, tag: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == tag
        && node.tag_name().namespace() == Some(MDFE_NAMESPACE)
}

/// Premier descendant (hors le noeud lui-meme) portant ce nom
fn find<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|n| is_tag(n, tag))
}

fn find_all<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants().skip(1).filter(move |n| is_tag(n, tag))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is_tag(n, tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_tag(n, tag))
}

fn node_text(node: Option<Node>) -> String {
    node.and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Texte du premier descendant `tag` de `node`, chaine vide si absent
fn text(node: Option<Node>, tag: &str) -> String {
    node_text(node.and_then(|n| find(n, tag)))
}

fn child_text(node: Node, tag: &str) -> String {
    node_text(child(node, tag))
}

/// Analyse le XML et extrait le manifeste
pub fn parse_manifest(xml: &str) -> Result<Manifest, DamdfeError> {
    let doc = Document::parse(xml)?;
    let root = doc.root();

    let inf_mdfe = if is_tag(&doc.root_element(), "infMDFe") {
        doc.root_element()
    } else {
        find(root, "infMDFe").ok_or(DamdfeError::MissingElement("infMDFe"))?
    };

    let id = inf_mdfe
        .attribute("Id")
        .ok_or(DamdfeError::MissingAttribute {
            element: "infMDFe",
            attribute: "Id",
        })?;
    let access_key = id.strip_prefix("MDFe").unwrap_or(id).to_string();

    let manifest = Manifest {
        access_key,
        identification: read_identification(find(inf_mdfe, "ide"))?,
        emitter: read_emitter(find(inf_mdfe, "emit")),
        road: read_road_modal(find(inf_mdfe, "infModal"))?,
        totals: read_totals(find(inf_mdfe, "tot"))?,
        unloading: read_unloading(find(inf_mdfe, "infDoc")),
        insurances: find_all(inf_mdfe, "seg").map(read_insurance).collect(),
        additional: Additional {
            fisco: text(find(inf_mdfe, "infAdic"), "infAdFisco"),
            taxpayer: text(find(inf_mdfe, "infAdic"), "infCpl"),
        },
        qr_code: text(find(root, "infMDFeSupl"), "qrCodMDFe"),
        protocol: read_protocol(find(root, "protMDFe"))?,
    };

    tracing::debug!(
        key = %manifest.access_key,
        documents = manifest.linked_documents().len(),
        vehicles = manifest.road.vehicles.len(),
        "manifeste extrait"
    );

    Ok(manifest)
}

fn read_identification(ide: Option<Node>) -> Result<Identification, DamdfeError> {
    let code = |tag: &str| text(ide, tag);

    let emission_type = EmissionType::from_code(&code("tpEmis")).ok_or_else(|| {
        DamdfeError::UnknownCode {
            field: "tpEmis",
            value: code("tpEmis"),
        }
    })?;
    let emitter_type =
        EmitterType::from_code(&code("tpEmit")).ok_or_else(|| DamdfeError::UnknownCode {
            field: "tpEmit",
            value: code("tpEmit"),
        })?;
    let environment =
        Environment::from_code(&code("tpAmb")).ok_or_else(|| DamdfeError::UnknownCode {
            field: "tpAmb",
            value: code("tpAmb"),
        })?;

    let route = ide
        .map(|ide| {
            children(ide, "infPercurso")
                .map(|per| child_text(per, "UFPer"))
                .filter(|uf| !uf.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Identification {
        model: code("mod"),
        series: code("serie"),
        number: code("nMDF"),
        issued_at: split_datetime_utc("dhEmi", &code("dhEmi"))?,
        loading_uf: code("UFIni"),
        unloading_uf: code("UFFim"),
        emission_type,
        trip_start: split_datetime_utc("dhIniViagem", &code("dhIniViagem"))?,
        emitter_type,
        environment,
        route,
        later_loading: code("indCarregaPosterior") == "1",
    })
}

fn read_emitter(emit: Option<Node>) -> Emitter {
    let Some(emit) = emit else {
        return Emitter::default();
    };
    let address = find(emit, "enderEmit");
    let document = match child_text(emit, "CNPJ") {
        cnpj if !cnpj.is_empty() => cnpj,
        _ => child_text(emit, "CPF"),
    };

    Emitter {
        name: child_text(emit, "xNome"),
        street: text(address, "xLgr"),
        number: text(address, "nro"),
        district: text(address, "xBairro"),
        cep: text(address, "CEP"),
        city: text(address, "xMun"),
        uf: text(address, "UF"),
        document,
        ie: child_text(emit, "IE"),
        phone: text(address, "fone"),
    }
}

fn read_vehicle(vehicle: Node, modal_rntrc: &str) -> Vehicle {
    let owner_rntrc = text(child(vehicle, "prop"), "RNTRC");
    Vehicle {
        plate: child_text(vehicle, "placa"),
        uf: child_text(vehicle, "UF"),
        rntrc: if owner_rntrc.is_empty() {
            modal_rntrc.to_string()
        } else {
            owner_rntrc
        },
        renavam: child_text(vehicle, "RENAVAM"),
    }
}

fn read_road_modal(inf_modal: Option<Node>) -> Result<RoadModal, DamdfeError> {
    let Some(rodo) = inf_modal.and_then(|n| find(n, "rodo")) else {
        return Ok(RoadModal::default());
    };

    let rntrc = text(find(rodo, "infANTT"), "RNTRC");
    let traction = child(rodo, "veicTracao");

    let vehicles = traction
        .into_iter()
        .chain(children(rodo, "veicReboque"))
        .map(|v| read_vehicle(v, &rntrc))
        .collect();

    let drivers = traction
        .map(|t| {
            children(t, "condutor")
                .map(|c| Driver {
                    cpf: child_text(c, "CPF"),
                    name: child_text(c, "xNome"),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut tolls = Vec::new();
    if let Some(vale_ped) = find(rodo, "valePed") {
        for disp in children(vale_ped, "disp") {
            let payer = match child_text(disp, "CNPJPg") {
                cnpj if !cnpj.is_empty() => cnpj,
                _ => child_text(disp, "CPFPg"),
            };
            tolls.push(TollVoucher {
                supplier_cnpj: child_text(disp, "CNPJForn"),
                payer_document: payer,
                voucher_number: child_text(disp, "nCompra"),
                value: parse_decimal("vValePed", &child_text(disp, "vValePed"))?,
            });
        }
    }

    Ok(RoadModal {
        rntrc,
        vehicles,
        drivers,
        tolls,
    })
}

fn read_totals(tot: Option<Node>) -> Result<Totals, DamdfeError> {
    Ok(Totals {
        cte_count: text(tot, "qCTe"),
        nfe_count: text(tot, "qNFe"),
        cargo_value: parse_decimal("vCarga", &text(tot, "vCarga"))?,
        cargo_weight: parse_decimal("qCarga", &text(tot, "qCarga"))?,
    })
}

fn read_unloading(inf_doc: Option<Node>) -> Vec<UnloadingCity> {
    let Some(inf_doc) = inf_doc else {
        return Vec::new();
    };

    children(inf_doc, "infMunDescarga")
        .map(|city| {
            let documents = city
                .children()
                .filter_map(|doc| {
                    let (kind, key_tag) = if is_tag(&doc, "infCTe") {
                        (DocumentKind::Cte, "chCTe")
                    } else if is_tag(&doc, "infNFe") {
                        (DocumentKind::Nfe, "chNFe")
                    } else if is_tag(&doc, "infMDFeTransp") {
                        (DocumentKind::Mdfe, "chMDFe")
                    } else {
                        return None;
                    };
                    let key = child_text(doc, key_tag);
                    (!key.is_empty()).then_some(LinkedDocument { kind, key })
                })
                .collect();

            UnloadingCity {
                name: child_text(city, "xMunDescarga"),
                documents,
            }
        })
        .collect()
}

fn read_insurance(seg: Node) -> Insurance {
    let insurer = child(seg, "infSeg");
    Insurance {
        insurer_name: text(insurer, "xSeg"),
        insurer_cnpj: text(insurer, "CNPJ"),
        policy: child_text(seg, "nApol"),
        endorsements: children(seg, "nAver")
            .map(|n| node_text(Some(n)))
            .filter(|n| !n.is_empty())
            .collect(),
    }
}

fn read_protocol(prot: Option<Node>) -> Result<Option<Protocol>, DamdfeError> {
    let Some(prot) = prot else {
        return Ok(None);
    };
    Ok(Some(Protocol {
        number: text(Some(prot), "nProt"),
        received_at: split_datetime_utc("dhRecbto", &text(Some(prot), "dhRecbto"))?,
    }))
}
