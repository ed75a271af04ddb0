//! Usage: Same-origin `/api/*` resources and the backend action each one maps to.
//!
//! Backend action names are irregular (`FetFuncionarioById`, `GetServicoByhNome`,
//! `Funcionario/PostCliente`, ...) and must be sent exactly as listed.

/// Backend path for an id-scoped action: `prefix` + id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IdAction {
    pub(crate) prefix: &'static str,
}

impl IdAction {
    pub(crate) fn path(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}

/// Read-only lookup by a named attribute: `/api/<resource>/<segment>/:value`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lookup {
    pub(crate) segment: &'static str,
    pub(crate) prefix: &'static str,
}

impl Lookup {
    pub(crate) fn path(&self, value: &str) -> String {
        format!("{}{}", self.prefix, value)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Resource {
    pub(crate) route: &'static str,
    pub(crate) list: &'static str,
    pub(crate) create: &'static str,
    pub(crate) get: Option<IdAction>,
    pub(crate) update: Option<IdAction>,
    pub(crate) delete: Option<IdAction>,
    pub(crate) lookups: &'static [Lookup],
}

impl Resource {
    pub(crate) fn collection_route(&self) -> String {
        format!("/api/{}", self.route)
    }

    pub(crate) fn item_route(&self) -> Option<String> {
        let has_item_actions =
            self.get.is_some() || self.update.is_some() || self.delete.is_some();
        has_item_actions.then(|| format!("/api/{}/:id", self.route))
    }

    pub(crate) fn lookup_route(&self, lookup: &Lookup) -> String {
        format!("/api/{}/{}/:value", self.route, lookup.segment)
    }
}

const fn id(prefix: &'static str) -> Option<IdAction> {
    Some(IdAction { prefix })
}

pub(crate) static RESOURCES: &[Resource] = &[
    Resource {
        route: "clientes",
        list: "Cliente/GetCliente",
        create: "Cliente/PostCliente",
        get: id("Cliente/GetClienteById"),
        update: id("Cliente/PutCliente"),
        delete: id("Cliente/DeleteCliente"),
        lookups: &[],
    },
    Resource {
        route: "funcionarios",
        list: "Funcionario/GetFuncionario",
        create: "Funcionario/PostCliente",
        get: id("Funcionario/FetFuncionarioById"),
        update: id("Funcionario/PutCliente"),
        delete: id("Funcionario/DeleteFuncionario"),
        lookups: &[Lookup {
            segment: "nome",
            prefix: "Funcionario/GetFuncionarioByNome/",
        }],
    },
    Resource {
        route: "servicos",
        list: "Servico/GetServico",
        create: "Servico/PostService",
        get: id("Servico/GetServicoById"),
        update: id("Servico/PutServico"),
        delete: id("Servico/DeleteServico"),
        lookups: &[Lookup {
            segment: "nome",
            prefix: "Servico/GetServicoByhNome/",
        }],
    },
    Resource {
        route: "marcas",
        list: "Marca",
        create: "Marca",
        get: id("Marca/"),
        update: id("Marca/"),
        delete: id("Marca/"),
        lookups: &[],
    },
    Resource {
        route: "veiculos",
        list: "Veiculo",
        create: "Veiculo",
        get: None,
        update: None,
        delete: None,
        lookups: &[
            Lookup {
                segment: "tipo",
                prefix: "Veiculo/tipo/",
            },
            Lookup {
                segment: "placa",
                prefix: "Veiculo/placa/",
            },
        ],
    },
    Resource {
        route: "cores",
        list: "Cor",
        create: "Cor",
        get: None,
        update: None,
        delete: None,
        lookups: &[],
    },
];
